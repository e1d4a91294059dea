//! Heartbeat Daemon
//!
//! Runs the agent's cycle on a fixed interval. Uses `tokio::time::interval`
//! for the tick loop and `Arc<AtomicBool>` for graceful shutdown
//! signaling. Cycles are serialized: the loop awaits each cycle before
//! taking the next tick, so a slow cycle delays the next one instead of
//! overlapping it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::agent::Agent;

/// The heartbeat daemon. Owns a background tokio task that drives the
/// agent, one cycle per tick. The first cycle runs immediately on start.
pub struct HeartbeatDaemon {
    /// Atomic flag indicating whether the daemon is running.
    running: Arc<AtomicBool>,
    /// Handle to the spawned background task.
    interval_handle: Option<JoinHandle<()>>,
    /// Seconds between cycle starts.
    interval_secs: u64,
}

/// Create a new heartbeat daemon with the given cycle interval.
pub fn create_heartbeat_daemon(interval_secs: u64) -> HeartbeatDaemon {
    HeartbeatDaemon {
        running: Arc::new(AtomicBool::new(false)),
        interval_handle: None,
        interval_secs,
    }
}

impl HeartbeatDaemon {
    /// Start the daemon, taking ownership of the agent.
    ///
    /// A failed cycle is logged and the loop continues; the next tick
    /// gets a fresh chance.
    pub fn start(&mut self, mut agent: Agent) {
        if self.running.load(Ordering::SeqCst) {
            warn!("Heartbeat daemon is already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        info!(
            "Starting heartbeat daemon with {}s cycle interval",
            self.interval_secs
        );

        let running = Arc::clone(&self.running);
        let interval_secs = self.interval_secs;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                if !running.load(Ordering::SeqCst) {
                    info!("Heartbeat daemon stopping");
                    break;
                }

                // Awaiting here is what serializes cycles.
                if let Err(e) = agent.run_cycle().await {
                    error!("Heartbeat cycle failed: {:#}", e);
                }
            }
        });

        self.interval_handle = Some(handle);
    }

    /// Stop the daemon. An in-flight cycle is aborted mid-call; there is
    /// no cleanup beyond dropping the task.
    pub fn stop(&mut self) {
        if !self.running.load(Ordering::SeqCst) {
            debug!("Heartbeat daemon is not running");
            return;
        }

        info!("Stopping heartbeat daemon");
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.interval_handle.take() {
            handle.abort();
        }
    }

    /// Returns whether the daemon is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
