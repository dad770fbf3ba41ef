//! Job repository: row operations on the `job_queue` table.

use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{Database, DatabaseError};

const COLUMNS: &str = "id, action_id, action, status, created_at, updated_at";

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub action_id: String,
    pub action: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            action_id: row.get("action_id")?,
            action: row.get("action")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a new `todo` job and returns its id.
pub fn insert(
    db: &Database,
    action_id: &str,
    action: &str,
    now: &str,
) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO job_queue (action_id, action, status, created_at, updated_at)
             VALUES (?1, ?2, 'todo', ?3, ?3)",
            params![action_id, action, now],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Atomically moves the oldest `todo` job with one of the given actions to
/// `doing` and returns it.
///
/// The select and the status change are one statement, and the outer
/// `status = 'todo'` guard means a row another connection claimed first is
/// never returned twice.
pub fn claim_next(
    db: &Database,
    actions: &[&str],
    now: &str,
) -> Result<Option<JobRow>, DatabaseError> {
    if actions.is_empty() {
        return Ok(None);
    }

    let placeholders = (0..actions.len())
        .map(|i| format!("?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE job_queue SET status = 'doing', updated_at = ?1
         WHERE status = 'todo' AND id = (
             SELECT id FROM job_queue
             WHERE status = 'todo' AND action IN ({})
             ORDER BY id ASC
             LIMIT 1
         )
         RETURNING {}",
        placeholders, COLUMNS
    );

    db.with_conn(|conn| {
        let values = std::iter::once(now).chain(actions.iter().copied());
        let row = conn
            .query_row(&sql, params_from_iter(values), JobRow::from_row)
            .optional()?;
        Ok(row)
    })
}

/// Finds a job by its id.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM job_queue WHERE id = ?1", COLUMNS),
                params![id],
                JobRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Lists all jobs, newest first.
pub fn list(db: &Database) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM job_queue ORDER BY id DESC",
            COLUMNS
        ))?;
        let rows = stmt
            .query_map([], JobRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Moves a job from `from` to `to`. Returns the number of rows changed,
/// which is zero when the job is gone or not in `from`.
pub fn transition(
    db: &Database,
    id: i64,
    from: &str,
    to: &str,
    now: &str,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE job_queue SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
            params![id, from, to, now],
        )?;
        Ok(changed)
    })
}

/// Returns every job in `from` last updated before `cutoff` to `to`.
pub fn transition_stale(
    db: &Database,
    from: &str,
    to: &str,
    cutoff: &str,
    now: &str,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE job_queue SET status = ?2, updated_at = ?4
             WHERE status = ?1 AND updated_at < ?3",
            params![from, to, cutoff, now],
        )?;
        Ok(changed)
    })
}

/// Sets every job that is not already in `status` to `status`.
pub fn set_all_status(db: &Database, status: &str, now: &str) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE job_queue SET status = ?1, updated_at = ?2 WHERE status != ?1",
            params![status, now],
        )?;
        Ok(changed)
    })
}

/// Deletes a job. Returns whether a row existed.
pub fn delete(db: &Database, id: i64) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute("DELETE FROM job_queue WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    })
}

/// Deletes every job and returns how many were removed.
pub fn delete_all(db: &Database) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| Ok(conn.execute("DELETE FROM job_queue", [])?))
}

/// Counts jobs with the given status.
pub fn count_by_status(db: &Database, status: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM job_queue WHERE status = ?1",
            params![status],
            |r| r.get(0),
        )?;
        Ok(count as u64)
    })
}
