use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sessions: SessionInfo,
}

#[derive(Serialize)]
pub struct SessionInfo {
    pub arenas: usize,
    pub active: usize,
    pub players: usize,
}

/// GET /health: answers only while the tick loop is alive.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let (arenas, active, players) = state
        .tick
        .call(|m| (m.arena_count(), m.active_count(), m.total_players()))
        .await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        sessions: SessionInfo {
            arenas,
            active,
            players,
        },
    }))
}
