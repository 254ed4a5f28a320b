//! Activity log model.
//!
//! Every meaningful mutation appends a human-readable entry here. The log
//! is append-only and one-directional: nothing else references it, and the
//! only destructive operation is a full wipe.

use serde::{Deserialize, Serialize};

/// Action tags written by the structured mutations.
///
/// The log column is a plain string (the generic `log add` escape hatch
/// accepts arbitrary tags); this enum covers the tags the tracker itself
/// writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    ProjectCreated,
    Created,
    Completed,
    Started,
    Blocked,
    Updated,
    Prioritized,
    SubtaskCreated,
    SubtaskCompleted,
    SubtaskUnchecked,
}

impl ActionKind {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::Created => "created",
            Self::Completed => "completed",
            Self::Started => "started",
            Self::Blocked => "blocked",
            Self::Updated => "updated",
            Self::Prioritized => "prioritized",
            Self::SubtaskCreated => "subtask_created",
            Self::SubtaskCompleted => "subtask_completed",
            Self::SubtaskUnchecked => "subtask_unchecked",
        }
    }
}

/// One activity log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Row ID, assigned by the database
    pub id: i64,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    /// Short action tag, e.g. "completed", "prioritized"
    pub action: String,
    /// Human-readable description assembled at mutation time
    pub description: String,
    /// Creation time (Unix milliseconds)
    pub timestamp: i64,
}

impl ActionLogEntry {
    /// Build an entry to stage for insertion (id assigned by the database).
    #[must_use]
    pub fn new(
        project_id: Option<&str>,
        task_id: Option<&str>,
        action: &str,
        description: String,
    ) -> Self {
        Self {
            id: 0,
            project_id: project_id.map(ToString::to_string),
            task_id: task_id.map(ToString::to_string),
            action: action.to_string(),
            description,
            timestamp: super::now_ms(),
        }
    }
}
