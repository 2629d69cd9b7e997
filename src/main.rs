mod auction;
mod service;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let rankings = service::RankingStore::new();
    let sessions = service::SessionManager::new();

    let svc_ctr = service::ServiceControl::new();

    ctrlc::set_handler({
        let svc_ctr = svc_ctr.clone();
        move || {
            eprintln!("Stopping all services...");
            svc_ctr.stop_all();
        }
    })?;

    let listen = std::env::var("GAVEL_LISTEN")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_owned())
        .parse()
        .context("invalid GAVEL_LISTEN address")?;

    svc_ctr
        .spawn_loop(service::Ui::new(listen, rankings, sessions)?)
        .join()?;

    Ok(())
}

#[cfg(test)]
mod tests;
