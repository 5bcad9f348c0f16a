pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod session_manager;
pub mod state;
pub mod stats;
pub mod tick_loop;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use prophunt_core::adapters::{SystemClock, TracingPresentation};
use prophunt_core::world::InMemoryWorld;
use prophunt_core::{Arena, Host};

use config::ServerConfig;
use session_manager::SessionManager;
use state::AppState;
use stats::{ChannelStats, spawn_stats_aggregator};
use tick_loop::spawn_tick_loop;

/// Host for a headless server: in-memory world, log-only presentation.
pub fn headless_host(stats: ChannelStats) -> Host {
    Host::new(
        Box::new(InMemoryWorld::new()),
        Box::new(TracingPresentation),
        Box::new(stats),
        Box::new(SystemClock::new()),
    )
}

/// Build the Axum router and application state from a config and the
/// arenas to serve. Spawns the stats aggregator and the tick loop, so it
/// must run inside a tokio runtime.
pub fn build_app(config: ServerConfig, arenas: Vec<Arena>) -> (Router<()>, AppState) {
    let (sink, totals, _stats_task) = spawn_stats_aggregator();
    let mut manager = SessionManager::new(headless_host(sink));
    for arena in arenas {
        manager.add_arena(arena);
    }
    let (tick, _tick_task) = spawn_tick_loop(
        manager,
        config.tick_rate,
        config.limits.command_buffer,
    );

    let state = AppState {
        tick,
        stats: totals,
        config: Arc::new(config),
    };

    let api_routes = Router::new()
        .route("/join", post(api::join_any))
        .route("/leave", post(api::leave))
        .route("/team", post(api::select_team))
        .route("/disguise", post(api::change_disguise))
        .route("/lock", post(api::toggle_lock))
        .route("/rotate", post(api::rotate))
        .route("/taunt", post(api::taunt))
        .route("/attack", post(api::attack))
        .route("/move", post(api::move_player))
        .route("/status", get(api::get_status))
        .route("/stats/{player}", get(api::get_stats))
        .route("/arenas/{arena}", get(api::get_arena))
        .route("/arenas/{arena}/join", post(api::join_arena))
        .route("/arenas/{arena}/start", post(api::force_start))
        .route("/arenas/{arena}/stop", post(api::force_stop))
        .route("/arenas/{arena}/enabled", post(api::set_enabled))
        .route("/arenas/{arena}/time", post(api::adjust_time));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .with_state(state.clone());

    (app, state)
}
