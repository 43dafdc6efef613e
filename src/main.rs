mod api;
mod config;
mod error;
mod extractor;
mod fetcher;
mod pipeline;
mod refresh;
mod store;
mod synth;
mod types;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::extractor::StatsPageExtractor;
use crate::fetcher::BrowserFetcher;
use crate::pipeline::Acquirer;
use crate::refresh::Refresher;
use crate::store::Store;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let store = Store::new(&cfg.data_path);
    info!("Squad document at {}", cfg.data_path);
    info!(
        "Tracking {} players: {}",
        cfg.roster.len(),
        cfg.roster
            .iter()
            .map(|r| r.label.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    );

    let fetcher = BrowserFetcher::new(&cfg);
    let extractor = StatsPageExtractor;
    let acquirer = Acquirer::new(cfg.clone(), fetcher, extractor, Arc::clone(&store));
    let refresher = Refresher::new(
        acquirer.clone(),
        cfg.roster.clone(),
        Duration::from_secs(cfg.refresh_delay_secs),
    );

    let state = ApiState {
        store,
        acquirer,
        refresher,
        roster: cfg.roster.clone(),
    };
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
