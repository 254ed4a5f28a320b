//! Data models for the task tracker.
//!
//! This module contains all domain models:
//! - Project
//! - Task
//! - Subtask
//! - ActionLogEntry

pub mod action_log;
pub mod project;
pub mod subtask;
pub mod task;

pub use action_log::{ActionKind, ActionLogEntry};
pub use project::{slugify, Priority, Project, ProjectStatus, ProjectWithStats};
pub use subtask::Subtask;
pub use task::{
    CompletedTask, FocusTask, ListPriority, Task, TaskStatus, TaskWithSubtasks, TODAY_CAPACITY,
};

/// Shorthand for the current time as Unix milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One week in milliseconds, the window for "done this week" and archiving.
pub const WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Generate a prefixed entity ID from a random UUID.
///
/// Matches the `proj_a1b2c3d4e5f6` shape used across all entities.
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_shape() {
        let id = new_id("task");
        assert!(id.starts_with("task_"));
        assert_eq!(id.len(), "task_".len() + 12);
    }
}
