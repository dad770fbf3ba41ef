//! Schema migrations for the catalogue and the job queue.
//!
//! `_migrations` records the highest applied version. Catalogue databases
//! written by the earlier front-ends already have `review.quality` and
//! `review.mentioned_titles`, so those two steps only add a column that is
//! missing and otherwise just record the version.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
    step: Step,
}

enum Step {
    Execute,
    /// Adds `table.column` unless an adopted database already has it.
    AddColumn {
        table: &'static str,
        column: &'static str,
    },
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_movie_table",
        sql: include_str!("sql/001_create_movie.sql"),
        step: Step::Execute,
    },
    Migration {
        version: 2,
        description: "create_review_table",
        sql: include_str!("sql/002_create_review.sql"),
        step: Step::Execute,
    },
    Migration {
        version: 3,
        description: "create_job_queue_table",
        sql: include_str!("sql/003_create_job_queue.sql"),
        step: Step::Execute,
    },
    Migration {
        version: 4,
        description: "add_quality_to_review",
        sql: include_str!("sql/004_add_review_quality.sql"),
        step: Step::AddColumn {
            table: "review",
            column: "quality",
        },
    },
    Migration {
        version: 5,
        description: "add_mentioned_titles_to_review",
        sql: include_str!("sql/005_add_review_mentioned_titles.sql"),
        step: Step::AddColumn {
            table: "review",
            column: "mentioned_titles",
        },
    },
];

/// Brings the schema up to the latest version. Each step commits together
/// with its `_migrations` row.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        apply(conn, migration)?;
    }

    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    let failed = |e: rusqlite::Error| DatabaseError::Migration {
        version: migration.version,
        reason: e.to_string(),
    };

    let tx = conn.unchecked_transaction()?;
    match &migration.step {
        Step::AddColumn { table, column } if column_exists(&tx, table, column)? => {
            log::info!(
                "Adopting existing {}.{} for migration v{}",
                table,
                column,
                migration.version
            );
        }
        _ => {
            log::info!(
                "Running migration v{}: {}",
                migration.version,
                migration.description
            );
            tx.execute_batch(migration.sql).map_err(failed)?;
        }
    }
    tx.execute(
        "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
        rusqlite::params![migration.version, migration.description],
    )?;
    tx.commit().map_err(failed)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    // Identifiers cannot be bound in PRAGMA arguments.
    if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DatabaseError::Migration {
            version: 0,
            reason: format!("Invalid table name: {}", table),
        });
    }
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|r| r.map(|name| name == column).unwrap_or(false));
    Ok(exists)
}
