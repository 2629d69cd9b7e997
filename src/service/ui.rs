//! HTTP front end
//!
//! Thin glue between the wire and the two stores: parses identifiers,
//! amounts and session keys, rejects malformed input, and maps store
//! results to status codes. All ranking and session rules live behind
//! [`RankingStore`] and [`SessionManager`].

use crate::auction::{Amount, Bid, ItemId, UserId};
use crate::service::ranking::{RankingError, RankingStore};
use crate::service::session::{SessionError, SessionManager};
use crate::service::LoopService;
use anyhow::{format_err, Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::{runtime::Runtime, sync::oneshot};
use tracing::{debug, info};

pub struct Ui {
    // cancels all tasks on drop
    _runtime: Runtime,
    server_rx: oneshot::Receiver<Result<()>>,
}

#[derive(Clone)]
struct AppState {
    rankings: RankingStore,
    sessions: SessionManager,
}

#[derive(Error, Debug)]
enum ApiError {
    #[error("invalid session key")]
    InvalidSession,
    #[error("invalid bid")]
    InvalidBid,
    #[error("no such item")]
    UnknownItem,
}

impl From<SessionError> for ApiError {
    fn from(_: SessionError) -> Self {
        ApiError::InvalidSession
    }
}

impl From<RankingError> for ApiError {
    fn from(_: RankingError) -> Self {
        ApiError::UnknownItem
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidSession => StatusCode::FORBIDDEN,
            ApiError::InvalidBid => StatusCode::BAD_REQUEST,
            ApiError::UnknownItem => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Deserialize)]
struct BidParams {
    #[serde(rename = "sessionKey")]
    session_key: String,
}

async fn login(State(state): State<AppState>, Path(user): Path<UserId>) -> String {
    state.sessions.login(user)
}

async fn place_bid(
    State(state): State<AppState>,
    Path(item): Path<ItemId>,
    Query(params): Query<BidParams>,
    body: String,
) -> Result<StatusCode, ApiError> {
    let user = state.sessions.validate(&params.session_key)?;
    let amount: Amount = body
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidBid)?;
    if amount.is_nan() {
        return Err(ApiError::InvalidBid);
    }
    state.rankings.submit_bid(item, Bid { user, amount });
    Ok(StatusCode::OK)
}

async fn top_bid_list(
    State(state): State<AppState>,
    Path(item): Path<ItemId>,
) -> Result<Json<Vec<Bid>>, ApiError> {
    let bids = state.rankings.top_bids(item)?;
    debug!(item, count = bids.len(), "top bid list");
    Ok(Json(bids))
}

async fn run_http_server(
    listen: SocketAddr,
    rankings: RankingStore,
    sessions: SessionManager,
) -> Result<()> {
    let app = Router::new()
        .route("/:user_id/login", get(login))
        .route("/:item_id/bid", post(place_bid))
        .route("/:item_id/topBidList", get(top_bid_list))
        .with_state(AppState { rankings, sessions });

    info!(%listen, "serving");
    axum::Server::try_bind(&listen)?
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

impl Ui {
    pub fn new(listen: SocketAddr, rankings: RankingStore, sessions: SessionManager) -> Result<Self> {
        let runtime = Runtime::new()?;

        let (tx, rx) = oneshot::channel();

        runtime.spawn(async move {
            tx.send(
                run_http_server(listen, rankings, sessions)
                    .await
                    .context("Failed to run http server"),
            )
            .expect("send to work");
        });

        Ok(Self {
            _runtime: runtime,
            server_rx: rx,
        })
    }
}

impl LoopService for Ui {
    fn run_iteration(&mut self) -> Result<()> {
        // don't hog the cpu
        std::thread::sleep(std::time::Duration::from_millis(100));

        match self.server_rx.try_recv() {
            Ok(res) => res,
            Err(oneshot::error::TryRecvError::Empty) => Ok(()),
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(format_err!("http server died without leaving a response?!"))
            }
        }
    }
}
