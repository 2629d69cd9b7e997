//! Per-item bid rankings
//!
//! The store behind "who are the top bidders for item X". Each item gets
//! its own [`BidRanking`] behind its own lock, so bids on different items
//! never contend.

use crate::auction::{Bid, BidRanking, ItemId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("no bids for item: {0}")]
    UnknownItem(ItemId),
}

/// Shared handle to every item's ranking. Cheap to clone.
#[derive(Clone, Default)]
pub struct RankingStore {
    items: Arc<Mutex<BTreeMap<ItemId, Arc<Mutex<BidRanking>>>>>,
}

impl RankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `bid` into the ranking for `item`, creating the ranking on
    /// the item's first bid. Total: every well-typed bid is accepted.
    pub fn submit_bid(&self, item: ItemId, bid: Bid) {
        let ranking = {
            let mut items = self.items.lock();
            items.entry(item).or_default().clone()
        };
        debug!(item, user = bid.user, amount = bid.amount, "bid");
        ranking.lock().submit(bid);
    }

    /// Current standings for `item`, best first. An item nobody has bid
    /// on yet has no ranking, which is distinct from an empty one.
    pub fn top_bids(&self, item: ItemId) -> Result<Vec<Bid>, RankingError> {
        let ranking = {
            let items = self.items.lock();
            items.get(&item).cloned()
        };
        ranking
            .map(|ranking| ranking.lock().snapshot())
            .ok_or(RankingError::UnknownItem(item))
    }
}
