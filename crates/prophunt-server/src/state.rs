use std::sync::Arc;

use crate::config::ServerConfig;
use crate::stats::SharedStats;
use crate::tick_loop::TickHandle;

#[derive(Clone)]
pub struct AppState {
    pub tick: TickHandle,
    pub stats: SharedStats,
    pub config: Arc<ServerConfig>,
}
