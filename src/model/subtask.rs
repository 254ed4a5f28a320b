//! Subtask model: a checklist line owned by a task.

use serde::{Deserialize, Serialize};

/// A checklist item under a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    /// Unique identifier (`sub_` + 12 hex chars)
    pub id: String,

    /// Owning task
    pub task_id: String,

    pub title: String,

    pub done: bool,

    /// Position within the task, assigned at creation
    pub sort_order: i64,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Subtask {
    /// Create a new unchecked subtask.
    #[must_use]
    pub fn new(task_id: &str, title: &str, sort_order: i64) -> Self {
        Self {
            id: super::new_id("sub"),
            task_id: task_id.to_string(),
            title: title.to_string(),
            done: false,
            sort_order,
            created_at: super::now_ms(),
        }
    }
}
