//! Periodic recovery of abandoned jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::JobQueue;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_ABANDON_AFTER: Duration = Duration::from_secs(2 * 24 * 60 * 60);

/// Runs [`JobQueue::sweep`] on a fixed interval in a background thread.
pub struct Sweeper {
    queue: JobQueue,
    interval: Duration,
    abandon_after: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Sweeper {
    pub fn new(queue: JobQueue, interval: Duration, abandon_after: Duration) -> Self {
        Self {
            queue,
            interval,
            abandon_after,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns the sweep thread. Each message on `trigger_rx` forces an
    /// immediate sweep; the thread exits once [`Sweeper::stop`] was called
    /// or every trigger sender is gone.
    pub fn start(&self, mut trigger_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let queue = self.queue.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;
        let abandon_after = self.abandon_after;

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!(error = %e, "Could not start sweeper runtime");
                    return;
                }
            };

            rt.block_on(async {
                let mut ticker = tokio::time::interval(interval);
                // The first tick completes immediately.
                ticker.tick().await;

                loop {
                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    tokio::select! {
                        _ = ticker.tick() => {},
                        trigger = trigger_rx.recv() => match trigger {
                            Ok(()) | Err(RecvError::Lagged(_)) => {
                                tracing::info!("Manual sweep triggered");
                            }
                            Err(RecvError::Closed) => break,
                        },
                    }

                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    tracing::debug!("Sweeping abandoned jobs");
                    if let Err(e) = queue.sweep(abandon_after) {
                        tracing::error!(error = %e, "Could not sweep job queue");
                    }
                }
            });
        })
    }

    /// Signals the sweeper to stop. Send a trigger afterwards to wake it.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}
