//! The polling worker loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, trace, warn, Instrument};

use super::{handlers, WorkerContext};
use crate::job::{Category, JobRecord, QueueError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Longest single sleep, so a stop request is noticed quickly.
const SLEEP_STEP: Duration = Duration::from_millis(200);

/// A sequential consumer of one or more job categories.
///
/// Several workers, in one process or many, can share a queue; the atomic
/// claim guarantees each job goes to only one of them.
pub struct Worker {
    ctx: WorkerContext,
    categories: Vec<Category>,
    poll_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Worker {
    pub fn new(ctx: WorkerContext, categories: Vec<Category>) -> Self {
        Self {
            ctx,
            categories,
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Flag that stops the loop when set, for use from signal handlers.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Asks the loop to stop after the current job.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Polls until stopped: sleep, claim, dispatch. Errors are logged and
    /// never end the loop.
    pub async fn run(&self) {
        let categories: Vec<&str> = self.categories.iter().map(|c| c.as_str()).collect();
        info!(
            categories = ?categories,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Worker started"
        );

        while !self.is_stopped() {
            self.pause().await;
            if self.is_stopped() {
                break;
            }

            if let Err(e) = self.run_once().await {
                error!(error = %e, "Could not claim next job");
            }
        }

        info!("Worker stopped");
    }

    /// Claims and processes at most one job. Returns whether a job was
    /// claimed.
    pub async fn run_once(&self) -> Result<bool, QueueError> {
        let Some(job) = self.ctx.queue.claim_next_in(&self.categories)? else {
            trace!("No work available");
            return Ok(false);
        };

        let span = tracing::info_span!(
            "job",
            job_id = job.id,
            action = %job.action,
            subject_id = %job.subject_id
        );
        self.process(job).instrument(span).await;
        Ok(true)
    }

    async fn process(&self, job: JobRecord) {
        let action = match job.parse_action() {
            Ok(action) => action,
            Err(e) => {
                warn!(job_id = job.id, error = %e, "Dropping job with unknown action");
                self.ctx.queue.mark_failed(job.id);
                return;
            }
        };

        match handlers::handle(&self.ctx, job.id, action, &job.subject_id).await {
            Ok(()) => {
                self.ctx.queue.mark_done(job.id);
                info!(job_id = job.id, %action, "Job done");
            }
            Err(e) => {
                error!(job_id = job.id, %action, error = %e, "Job failed");
                self.ctx.queue.mark_failed(job.id);
            }
        }
    }

    async fn pause(&self) {
        let deadline = Instant::now() + self.poll_interval;
        loop {
            let now = Instant::now();
            if now >= deadline || self.is_stopped() {
                return;
            }
            tokio::time::sleep((deadline - now).min(SLEEP_STEP)).await;
        }
    }
}
