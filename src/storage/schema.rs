//! Database schema definitions.
//!
//! The four collections (projects, tasks, subtasks, action log) plus
//! schema version tracking. Timestamps are stored as INTEGER Unix
//! milliseconds throughout.

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the tracker database.
///
/// `sort_order` carries the manual display position (the upstream
/// schema's `order`, renamed to stay out of SQL keyword territory).
pub const SCHEMA_SQL: &str = r#"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Core Tables
-- ====================

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'active',
    priority TEXT NOT NULL DEFAULT 'medium',
    sort_order INTEGER NOT NULL,
    local_path TEXT,
    github_path TEXT,
    created_at INTEGER NOT NULL,
    CHECK (status IN ('active', 'blocked', 'completed', 'planning')),
    CHECK (priority IN ('high', 'medium', 'low'))
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'todo',
    list_priority TEXT,
    ai_prompt TEXT,
    blocked_reason TEXT,
    sort_order INTEGER NOT NULL,
    completed_at INTEGER,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
    CHECK (status IN ('todo', 'in_progress', 'done', 'blocked')),
    CHECK (list_priority IN ('today', 'this_week'))
);

CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_list_priority ON tasks(list_priority);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);

CREATE TABLE IF NOT EXISTS subtasks (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL,
    title TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    sort_order INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_subtasks_task ON subtasks(task_id);

-- ====================
-- Activity Log
-- ====================

-- Append-only; no foreign keys so entries survive any future entity
-- removal. project_id/task_id are informational references.
CREATE TABLE IF NOT EXISTS action_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT,
    task_id TEXT,
    action TEXT NOT NULL,
    description TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_action_logs_timestamp ON action_logs(timestamp DESC);
"#;

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // Set pragmas before schema creation
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    // Apply schema
    conn.execute_batch(SCHEMA_SQL)?;

    // Record schema version
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).expect("Failed to apply schema");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"projects".to_string()));
        assert!(tables.contains(&"tasks".to_string()));
        assert!(tables.contains(&"subtasks".to_string()));
        assert!(tables.contains(&"action_logs".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        apply_schema(&conn).expect("First apply failed");
        apply_schema(&conn).expect("Second apply failed");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
    }

    #[test]
    fn test_status_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO projects (id, name, slug, sort_order, created_at)
             VALUES ('p1', 'Test', 'test', 0, 0)",
            [],
        );
        assert!(result.is_ok());

        // Invalid status is rejected by the CHECK constraint
        let result = conn.execute(
            "INSERT INTO projects (id, name, slug, status, sort_order, created_at)
             VALUES ('p2', 'Test2', 'test2', 'bogus', 1, 0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_slug_unique_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO projects (id, name, slug, sort_order, created_at)
             VALUES ('p1', 'Test', 'test', 0, 0)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO projects (id, name, slug, sort_order, created_at)
             VALUES ('p2', 'Test Again', 'test', 1, 0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_null_list_priority_passes_check() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO projects (id, name, slug, sort_order, created_at)
             VALUES ('p1', 'Test', 'test', 0, 0)",
            [],
        )
        .unwrap();

        // NULL (backlog) is fine; a bogus value is not
        conn.execute(
            "INSERT INTO tasks (id, project_id, title, sort_order, created_at)
             VALUES ('t1', 'p1', 'Task', 0, 0)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO tasks (id, project_id, title, list_priority, sort_order, created_at)
             VALUES ('t2', 'p1', 'Task', 'someday', 1, 0)",
            [],
        );
        assert!(result.is_err());
    }
}
