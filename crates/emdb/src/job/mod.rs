//! Durable job queue.
//!
//! Jobs live in the `job_queue` table and move `todo -> doing -> (deleted)`
//! on success or `doing -> failed` on failure. The [`Sweeper`] returns jobs
//! left in `doing` by a crashed worker to `todo`.

use thiserror::Error;

use crate::db::DatabaseError;

pub mod action;
pub mod queue;
pub mod record;
pub mod sweeper;

pub use action::{Action, Category};
pub use queue::{JobQueue, QueueStats};
pub use record::{JobRecord, JobStatus};
pub use sweeper::Sweeper;

/// Errors from queue operations.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Invalid action '{0}'")]
    InvalidAction(String),

    #[error("Invalid job status '{0}'")]
    InvalidStatus(String),

    #[error("Invalid worker category '{0}'")]
    InvalidCategory(String),

    #[error("Corrupt job row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
