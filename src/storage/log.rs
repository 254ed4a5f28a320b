//! Activity log storage and retrieval.
//!
//! The log is the audit trail for every meaningful mutation. Structured
//! mutations stage entries through the `MutationContext` so they commit
//! atomically with the write they describe; the functions here do the
//! actual row work.

use crate::model::ActionLogEntry;
use rusqlite::{Connection, Result};

/// Insert a log entry.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_entry(conn: &Connection, entry: &ActionLogEntry) -> Result<i64> {
    conn.execute(
        "INSERT INTO action_logs (project_id, task_id, action, description, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            entry.project_id,
            entry.task_id,
            entry.action,
            entry.description,
            entry.timestamp,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get the most recent entries, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_entries(conn: &Connection, limit: Option<u32>) -> Result<Vec<ActionLogEntry>> {
    let limit = limit.unwrap_or(20);
    let mut stmt = conn.prepare(
        "SELECT id, project_id, task_id, action, description, timestamp
         FROM action_logs
         ORDER BY timestamp DESC, id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit], |row| {
        Ok(ActionLogEntry {
            id: row.get(0)?,
            project_id: row.get(1)?,
            task_id: row.get(2)?,
            action: row.get(3)?,
            description: row.get(4)?,
            timestamp: row.get(5)?,
        })
    })?;

    rows.collect()
}

/// Delete every entry. Returns the number of rows removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn clear_entries(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM action_logs", [])
}
