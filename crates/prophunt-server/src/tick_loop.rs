use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::session_manager::SessionManager;

type ManagerFn = Box<dyn FnOnce(&mut SessionManager) + Send>;

/// Commands sent from request handlers to the tick loop.
pub enum TickCommand {
    /// Run a closure against the manager between frames.
    Run(ManagerFn),
    Stop,
}

impl std::fmt::Debug for TickCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run(_) => f.write_str("Run(..)"),
            Self::Stop => f.write_str("Stop"),
        }
    }
}

/// Cloneable handle for talking to the tick loop.
#[derive(Debug, Clone)]
pub struct TickHandle {
    tx: mpsc::Sender<TickCommand>,
}

impl TickHandle {
    /// Run `f` on the loop's task and wait for its result.
    pub async fn call<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut SessionManager) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = TickCommand::Run(Box::new(move |manager: &mut SessionManager| {
            // The caller may have gone away; nothing to do then.
            let _ = reply_tx.send(f(manager));
        }));
        self.tx
            .send(command)
            .await
            .map_err(|_| AppError::Unavailable)?;
        reply_rx.await.map_err(|_| AppError::Unavailable)
    }

    /// Ask the loop to end every session and exit.
    pub async fn stop(&self) {
        let _ = self.tx.send(TickCommand::Stop).await;
    }
}

/// Spawn the tick loop as a tokio task. The manager lives inside the task;
/// it is handed back when the loop exits.
pub fn spawn_tick_loop(
    manager: SessionManager,
    tick_rate: u32,
    command_buffer: usize,
) -> (TickHandle, JoinHandle<SessionManager>) {
    let (tx, rx) = mpsc::channel(command_buffer.max(1));
    let handle = tokio::spawn(run_tick_loop(manager, tick_rate.max(1), rx));
    (TickHandle { tx }, handle)
}

/// Frames run `sync_all`; every `tick_rate` frames one session second passes.
async fn run_tick_loop(
    mut manager: SessionManager,
    tick_rate: u32,
    mut cmd_rx: mpsc::Receiver<TickCommand>,
) -> SessionManager {
    let frame = Duration::from_secs_f64(1.0 / f64::from(tick_rate));
    let mut interval = tokio::time::interval(frame);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(tick_rate, "Tick loop started");
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                frames += 1;
                manager.sync_all();
                if frames % u64::from(tick_rate) == 0 {
                    manager.tick_all();
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(TickCommand::Run(f)) => f(&mut manager),
                    Some(TickCommand::Stop) | None => {
                        manager.end_all();
                        break;
                    }
                }
            }
        }
    }

    tracing::info!(frames, "Tick loop stopped");
    manager
}
