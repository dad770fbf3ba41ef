//! Job records as read back from the queue table.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{Action, QueueError};
use crate::db::job_repo::JobRow;

/// Persisted job status. Completed jobs are deleted, so there is no
/// `done` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Todo,
    Doing,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Todo => "todo",
            JobStatus::Doing => "doing",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(JobStatus::Todo),
            "doing" => Ok(JobStatus::Doing),
            "failed" => Ok(JobStatus::Failed),
            other => Err(QueueError::InvalidStatus(other.to_string())),
        }
    }
}

/// A job row with typed status and timestamps.
///
/// The action is kept as text: rows may be written by other tooling, and
/// the worker has to be able to drop a job whose action it does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    pub subject_id: String,
    pub action: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn parse_action(&self) -> Result<Action, QueueError> {
        self.action.parse()
    }
}

impl TryFrom<JobRow> for JobRecord {
    type Error = QueueError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = row.status.parse()?;
        let created_at = parse_timestamp(row.id, &row.created_at)?;
        let updated_at = parse_timestamp(row.id, &row.updated_at)?;
        Ok(Self {
            id: row.id,
            subject_id: row.action_id,
            action: row.action,
            status,
            created_at,
            updated_at,
        })
    }
}

/// Formats a timestamp the way the queue table stores it. Fixed precision
/// and a `Z` suffix keep text order equal to time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// SQLite's own `datetime('now')` / `CURRENT_TIMESTAMP` text, always UTC.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn parse_timestamp(id: i64, raw: &str) -> Result<DateTime<Utc>, QueueError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT)
        .map(|ts| ts.and_utc())
        .map_err(|e| QueueError::CorruptRow {
            id,
            reason: format!("bad timestamp '{}': {}", raw, e),
        })
}
