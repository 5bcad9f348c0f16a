use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;

use prophunt_core::ParticipantId;
use prophunt_core::adapters::StatsSink;
use prophunt_core::stats::{LifetimeStats, StatsDelta};

pub type SharedStats = Arc<RwLock<HashMap<ParticipantId, LifetimeStats>>>;

/// Stats sink that hands deltas to the aggregator task without blocking.
#[derive(Debug, Clone)]
pub struct ChannelStats {
    tx: mpsc::UnboundedSender<(ParticipantId, StatsDelta)>,
}

impl StatsSink for ChannelStats {
    fn record(&self, id: ParticipantId, delta: StatsDelta) {
        if self.tx.send((id, delta)).is_err() {
            tracing::warn!(player = %id, "Stats aggregator stopped; dropping delta");
        }
    }
}

/// Spawn the aggregator. Returns the sink for sessions, the shared totals and
/// the task handle. The task ends once every sink clone is dropped.
pub fn spawn_stats_aggregator() -> (ChannelStats, SharedStats, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<(ParticipantId, StatsDelta)>();
    let totals: SharedStats = Arc::new(RwLock::new(HashMap::new()));
    let store = Arc::clone(&totals);

    let handle = tokio::spawn(async move {
        while let Some((id, delta)) = rx.recv().await {
            let mut totals = store.write().await;
            totals.entry(id).or_default().apply(&delta);
            tracing::debug!(player = %id, points = delta.points, "Stats recorded");
        }
        tracing::info!("Stats channel closed, stopping aggregator");
    });

    (ChannelStats { tx }, totals, handle)
}
