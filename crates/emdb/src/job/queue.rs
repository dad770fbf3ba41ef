//! Queue operations over the job table.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::record::{format_timestamp, now_timestamp};
use super::{Action, Category, JobRecord, JobStatus, QueueError};
use crate::db::{job_repo, Database};

/// Job counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub todo: u64,
    pub doing: u64,
    pub failed: u64,
}

/// Handle to the job queue. Cheap to clone; clones share the database
/// handle.
///
/// The table is the only coordination point between workers: any number of
/// processes may open the same database and claim from it concurrently.
#[derive(Clone)]
pub struct JobQueue {
    db: Database,
}

impl JobQueue {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validates `action` and adds a `todo` job for `subject_id`.
    ///
    /// Not idempotent: the same arguments twice create two jobs.
    pub fn enqueue(&self, subject_id: &str, action: &str) -> Result<i64, QueueError> {
        let action: Action = action.parse()?;
        self.push(subject_id, action)
    }

    /// Adds a `todo` job for an already validated action.
    pub fn push(&self, subject_id: &str, action: Action) -> Result<i64, QueueError> {
        let id = job_repo::insert(&self.db, subject_id, action.as_str(), &now_timestamp())?;
        debug!(job_id = id, %action, subject_id, "Enqueued job");
        Ok(id)
    }

    /// Claims the oldest `todo` job in `category`. `Ok(None)` means there
    /// is no work right now.
    pub fn claim_next(&self, category: Category) -> Result<Option<JobRecord>, QueueError> {
        self.claim_next_in(&[category])
    }

    /// Claims the oldest `todo` job whose action is in any of `categories`.
    pub fn claim_next_in(&self, categories: &[Category]) -> Result<Option<JobRecord>, QueueError> {
        let actions: Vec<&str> = categories
            .iter()
            .flat_map(|c| c.actions())
            .map(|a| a.as_str())
            .collect();

        let Some(row) = job_repo::claim_next(&self.db, &actions, &now_timestamp())? else {
            return Ok(None);
        };

        let id = row.id;
        match JobRecord::try_from(row) {
            Ok(job) => {
                info!(job_id = job.id, action = %job.action, subject_id = %job.subject_id, "Claimed job");
                Ok(Some(job))
            }
            Err(e) => {
                // Already `doing`; left alone it would only come back via sweep.
                error!(job_id = id, error = %e, "Claimed unreadable job row");
                self.mark_failed(id);
                Err(e)
            }
        }
    }

    /// Removes a finished job. Failures are logged; at worst the job runs
    /// again.
    pub fn mark_done(&self, id: i64) {
        match job_repo::delete(&self.db, id) {
            Ok(true) => debug!(job_id = id, "Job done"),
            Ok(false) => warn!(job_id = id, "Job to mark done no longer exists"),
            Err(e) => error!(job_id = id, error = %e, "Could not mark job done"),
        }
    }

    /// Moves a claimed job to `failed`. Only `doing` jobs can fail.
    pub fn mark_failed(&self, id: i64) {
        let result = job_repo::transition(
            &self.db,
            id,
            JobStatus::Doing.as_str(),
            JobStatus::Failed.as_str(),
            &now_timestamp(),
        );
        match result {
            Ok(0) => warn!(job_id = id, "Job to mark failed is not in doing"),
            Ok(_) => debug!(job_id = id, "Job failed"),
            Err(e) => error!(job_id = id, error = %e, "Could not mark job failed"),
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<JobRecord>, QueueError> {
        job_repo::find_by_id(&self.db, id)?
            .map(JobRecord::try_from)
            .transpose()
    }

    /// All jobs, newest first.
    pub fn list(&self) -> Result<Vec<JobRecord>, QueueError> {
        job_repo::list(&self.db)?
            .into_iter()
            .map(JobRecord::try_from)
            .collect()
    }

    /// Deletes one job. Returns whether it existed.
    pub fn delete(&self, id: i64) -> Result<bool, QueueError> {
        Ok(job_repo::delete(&self.db, id)?)
    }

    pub fn delete_all(&self) -> Result<usize, QueueError> {
        let removed = job_repo::delete_all(&self.db)?;
        info!(removed, "Deleted all jobs");
        Ok(removed)
    }

    /// Forces every job, failed ones included, back to `todo`.
    pub fn reset_all(&self) -> Result<usize, QueueError> {
        let reset = job_repo::set_all_status(&self.db, JobStatus::Todo.as_str(), &now_timestamp())?;
        info!(reset, "Reset all jobs to todo");
        Ok(reset)
    }

    /// Returns every `doing` job not updated for longer than
    /// `abandon_after` to `todo`, and reports how many were recovered.
    pub fn sweep(&self, abandon_after: Duration) -> Result<usize, QueueError> {
        let now = Utc::now();
        let cutoff = TimeDelta::from_std(abandon_after)
            .ok()
            .and_then(|age| now.checked_sub_signed(age));
        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        let recovered = job_repo::transition_stale(
            &self.db,
            JobStatus::Doing.as_str(),
            JobStatus::Todo.as_str(),
            &format_timestamp(cutoff),
            &format_timestamp(now),
        )?;
        if recovered > 0 {
            warn!(recovered, "Returned abandoned jobs to todo");
        }
        Ok(recovered)
    }

    pub fn stats(&self) -> Result<QueueStats, QueueError> {
        Ok(QueueStats {
            todo: job_repo::count_by_status(&self.db, JobStatus::Todo.as_str())?,
            doing: job_repo::count_by_status(&self.db, JobStatus::Doing.as_str())?,
            failed: job_repo::count_by_status(&self.db, JobStatus::Failed.as_str())?,
        })
    }
}
