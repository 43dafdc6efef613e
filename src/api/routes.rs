use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::extractor::Extract;
use crate::fetcher::Fetch;
use crate::pipeline::Acquirer;
use crate::refresh::{Refresher, RefreshSummary};
use crate::store::Store;
use crate::types::{PlayerStats, RosterEntry};

#[derive(Clone)]
pub struct ApiState<F, E> {
    pub store: Arc<Store>,
    pub acquirer: Acquirer<F, E>,
    pub refresher: Refresher<F, E>,
    pub roster: Vec<RosterEntry>,
}

pub fn router<F, E>(state: ApiState<F, E>) -> Router
where
    F: Fetch + Clone + Send + Sync + 'static,
    E: Extract + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health::<F, E>))
        .route("/api/squad", get(get_squad::<F, E>))
        .route("/api/squad/refresh", post(refresh_squad::<F, E>))
        .route("/api/player/:steam_id", get(acquire_player::<F, E>))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    roster_size: usize,
    players_stored: usize,
}

async fn health<F, E>(State(state): State<ApiState<F, E>>) -> Json<HealthResponse>
where
    F: Fetch + Clone + Send + Sync + 'static,
    E: Extract + Clone + Send + Sync + 'static,
{
    Json(HealthResponse {
        status: "ok",
        roster_size: state.roster.len(),
        players_stored: state.store.read_all().await.len(),
    })
}

/// Full persisted collection. Read failures already degraded to an
/// empty collection inside the store — this never returns an error.
async fn get_squad<F, E>(State(state): State<ApiState<F, E>>) -> Json<Vec<PlayerStats>>
where
    F: Fetch + Clone + Send + Sync + 'static,
    E: Extract + Clone + Send + Sync + 'static,
{
    Json(state.store.read_all().await)
}

/// Synchronously drives a full roster refresh and reports per-player
/// status alongside the aggregate counts.
async fn refresh_squad<F, E>(State(state): State<ApiState<F, E>>) -> Json<RefreshSummary>
where
    F: Fetch + Clone + Send + Sync + 'static,
    E: Extract + Clone + Send + Sync + 'static,
{
    Json(state.refresher.refresh_all().await)
}

/// Single-player acquisition. Succeeds with the completed record (also
/// upserted into the store) or an error payload with the cause.
async fn acquire_player<F, E>(
    State(state): State<ApiState<F, E>>,
    Path(steam_id): Path<String>,
) -> Result<Json<PlayerStats>, AppError>
where
    F: Fetch + Clone + Send + Sync + 'static,
    E: Extract + Clone + Send + Sync + 'static,
{
    let entry = state
        .roster
        .iter()
        .find(|r| r.steam_id == steam_id)
        .cloned()
        .unwrap_or(RosterEntry { steam_id, label: String::new() });

    let record = state.acquirer.acquire(&entry).await?;
    Ok(Json(record))
}
