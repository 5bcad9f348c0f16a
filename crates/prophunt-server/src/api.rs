use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prophunt_core::disguise::PropSize;
use prophunt_core::geometry::Location;
use prophunt_core::stats::LifetimeStats;
use prophunt_core::{AttackOutcome, AttackTarget, SessionSnapshot, Team};

use crate::error::AppError;
use crate::session_manager::ServerStatus;
use crate::state::AppState;

/// Trim and length-check a display name.
fn validate_name(name: &str, max_len: usize) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if name.chars().count() > max_len {
        return Err(AppError::BadRequest(format!(
            "name exceeds {max_len} chars"
        )));
    }
    Ok(name.to_string())
}

// ================================================================
// Membership
// ================================================================

#[derive(Debug, Deserialize)]
pub struct JoinBody {
    pub player: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub arena: String,
}

/// POST /api/v1/arenas/{arena}/join
pub async fn join_arena(
    State(state): State<AppState>,
    Path(arena): Path<String>,
    Json(body): Json<JoinBody>,
) -> Result<(StatusCode, Json<JoinResponse>), AppError> {
    let name = validate_name(&body.name, state.config.limits.max_name_len)?;
    let player = body.player;
    let arena = state
        .tick
        .call(move |m| m.join(player, &name, Some(&arena)))
        .await??;
    Ok((StatusCode::CREATED, Json(JoinResponse { arena })))
}

/// POST /api/v1/join: join whichever session is fullest and still open.
pub async fn join_any(
    State(state): State<AppState>,
    Json(body): Json<JoinBody>,
) -> Result<(StatusCode, Json<JoinResponse>), AppError> {
    let name = validate_name(&body.name, state.config.limits.max_name_len)?;
    let player = body.player;
    let arena = state
        .tick
        .call(move |m| m.join(player, &name, None))
        .await??;
    Ok((StatusCode::CREATED, Json(JoinResponse { arena })))
}

#[derive(Debug, Deserialize)]
pub struct PlayerBody {
    pub player: Uuid,
}

/// POST /api/v1/leave
pub async fn leave(
    State(state): State<AppState>,
    Json(body): Json<PlayerBody>,
) -> Result<Json<JoinResponse>, AppError> {
    let player = body.player;
    let arena = state.tick.call(move |m| m.leave(player)).await??;
    Ok(Json(JoinResponse { arena }))
}

#[derive(Debug, Deserialize)]
pub struct TeamBody {
    pub player: Uuid,
    pub team: Team,
}

/// POST /api/v1/team
pub async fn select_team(
    State(state): State<AppState>,
    Json(body): Json<TeamBody>,
) -> Result<StatusCode, AppError> {
    let TeamBody { player, team } = body;
    state
        .tick
        .call(move |m| m.select_team(player, team))
        .await??;
    Ok(StatusCode::NO_CONTENT)
}

// ================================================================
// Admin
// ================================================================

/// POST /api/v1/arenas/{arena}/start
pub async fn force_start(
    State(state): State<AppState>,
    Path(arena): Path<String>,
) -> Result<StatusCode, AppError> {
    state.tick.call(move |m| m.force_start(&arena)).await??;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/arenas/{arena}/stop
pub async fn force_stop(
    State(state): State<AppState>,
    Path(arena): Path<String>,
) -> Result<StatusCode, AppError> {
    state.tick.call(move |m| m.force_stop(&arena)).await??;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

/// POST /api/v1/arenas/{arena}/enabled
pub async fn set_enabled(
    State(state): State<AppState>,
    Path(arena): Path<String>,
    Json(body): Json<EnabledBody>,
) -> Result<StatusCode, AppError> {
    let enabled = body.enabled;
    state
        .tick
        .call(move |m| m.set_arena_enabled(&arena, enabled))
        .await??;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct TimeBody {
    /// Positive adds time, negative removes it.
    pub seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct TimeResponse {
    pub remaining: u32,
}

/// POST /api/v1/arenas/{arena}/time
pub async fn adjust_time(
    State(state): State<AppState>,
    Path(arena): Path<String>,
    Json(body): Json<TimeBody>,
) -> Result<Json<TimeResponse>, AppError> {
    let seconds = body.seconds;
    let remaining = state
        .tick
        .call(move |m| m.adjust_time(&arena, seconds))
        .await??;
    Ok(Json(TimeResponse { remaining }))
}

// ================================================================
// Props
// ================================================================

#[derive(Debug, Deserialize)]
pub struct DisguiseBody {
    pub player: Uuid,
    pub material: String,
}

#[derive(Debug, Serialize)]
pub struct DisguiseResponse {
    pub material: String,
    pub display_name: String,
    pub size: PropSize,
}

/// POST /api/v1/disguise
pub async fn change_disguise(
    State(state): State<AppState>,
    Json(body): Json<DisguiseBody>,
) -> Result<Json<DisguiseResponse>, AppError> {
    let DisguiseBody { player, material } = body;
    let kind = state
        .tick
        .call(move |m| m.change_disguise(player, &material))
        .await??;
    Ok(Json(DisguiseResponse {
        display_name: kind.display_name(),
        size: kind.size,
        material: kind.material,
    }))
}

#[derive(Debug, Serialize)]
pub struct LockResponse {
    pub locked: bool,
}

/// POST /api/v1/lock: toggles.
pub async fn toggle_lock(
    State(state): State<AppState>,
    Json(body): Json<PlayerBody>,
) -> Result<Json<LockResponse>, AppError> {
    let player = body.player;
    let locked = state.tick.call(move |m| m.toggle_lock(player)).await??;
    Ok(Json(LockResponse { locked }))
}

#[derive(Debug, Deserialize)]
pub struct RotateBody {
    pub player: Uuid,
    pub degrees: f32,
}

#[derive(Debug, Serialize)]
pub struct RotateResponse {
    pub rotation: f32,
}

/// POST /api/v1/rotate
pub async fn rotate(
    State(state): State<AppState>,
    Json(body): Json<RotateBody>,
) -> Result<Json<RotateResponse>, AppError> {
    if !body.degrees.is_finite() {
        return Err(AppError::BadRequest("degrees must be finite".to_string()));
    }
    let RotateBody { player, degrees } = body;
    let rotation = state
        .tick
        .call(move |m| m.rotate_disguise(player, degrees))
        .await??;
    Ok(Json(RotateResponse { rotation }))
}

/// POST /api/v1/taunt
pub async fn taunt(
    State(state): State<AppState>,
    Json(body): Json<PlayerBody>,
) -> Result<StatusCode, AppError> {
    let player = body.player;
    state.tick.call(move |m| m.taunt(player)).await??;
    Ok(StatusCode::NO_CONTENT)
}

// ================================================================
// Hunters and movement
// ================================================================

#[derive(Debug, Deserialize)]
pub struct AttackBody {
    pub player: Uuid,
    pub target: AttackTarget,
}

/// POST /api/v1/attack
pub async fn attack(
    State(state): State<AppState>,
    Json(body): Json<AttackBody>,
) -> Result<Json<AttackOutcome>, AppError> {
    let AttackBody { player, target } = body;
    let outcome = state.tick.call(move |m| m.attack(player, target)).await??;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub player: Uuid,
    pub location: Location,
}

/// POST /api/v1/move
pub async fn move_player(
    State(state): State<AppState>,
    Json(body): Json<MoveBody>,
) -> Result<StatusCode, AppError> {
    let MoveBody { player, location } = body;
    let p = location.pos;
    if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite() && location.yaw.is_finite()) {
        return Err(AppError::BadRequest(
            "location must be finite".to_string(),
        ));
    }
    state
        .tick
        .call(move |m| m.move_player(player, location))
        .await??;
    Ok(StatusCode::NO_CONTENT)
}

// ================================================================
// Status
// ================================================================

/// GET /api/v1/arenas/{arena}
pub async fn get_arena(
    State(state): State<AppState>,
    Path(arena): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state.tick.call(move |m| m.snapshot(&arena)).await??;
    Ok(Json(snapshot))
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Result<Json<ServerStatus>, AppError> {
    let status = state.tick.call(|m| m.status()).await?;
    Ok(Json(status))
}

/// GET /api/v1/stats/{player}
pub async fn get_stats(
    State(state): State<AppState>,
    Path(player): Path<Uuid>,
) -> Result<Json<LifetimeStats>, AppError> {
    let totals = state.stats.read().await;
    totals
        .get(&player)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no stats for player {player}")))
}
