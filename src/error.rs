//! Error types for the task tracker CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, 5=capacity, 8=io)
//! - Retryability flags for agent self-correction
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for task tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Agents match on the string; shell scripts on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    ProjectNotFound,
    TaskNotFound,

    // Validation (exit 4)
    InvalidArgument,
    DuplicateSlug,

    // Capacity (exit 5)
    TodayListFull,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DuplicateSlug => "DUPLICATE_SLUG",
            Self::TodayListFull => "TODAY_LIST_FULL",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::ProjectNotFound | Self::TaskNotFound => 3,
            Self::InvalidArgument | Self::DuplicateSlug => 4,
            Self::TodayListFull => 5,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether an agent should retry with corrected input.
    ///
    /// True for validation errors (wrong status, priority, slug) and
    /// capacity rejections that clear after moving a task. False for
    /// not-found, I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::DuplicateSlug | Self::TodayListFull | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in task tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `tt init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Project \"{slug}\" not found")]
    ProjectNotFound { slug: String },

    #[error("Project \"{slug}\" not found (did you mean: {}?)", similar.join(", "))]
    ProjectNotFoundSimilar { slug: String, similar: Vec<String> },

    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    #[error("A project with slug \"{slug}\" already exists")]
    DuplicateSlug { slug: String },

    #[error("TODAY list is full (max 3). Complete or move a task first.")]
    TodayListFull,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::ProjectNotFound { .. } | Self::ProjectNotFoundSimilar { .. } => {
                ErrorCode::ProjectNotFound
            }
            Self::TaskNotFound { .. } => ErrorCode::TaskNotFound,
            Self::DuplicateSlug { .. } => ErrorCode::DuplicateSlug,
            Self::TodayListFull => ErrorCode::TodayListFull,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for agents and humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => Some("Run `tt init` to initialize the database".to_string()),

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::ProjectNotFound { slug } => Some(format!(
                "No project with slug '{slug}'. Use `tt project list` to see available projects."
            )),
            Self::ProjectNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::TaskNotFound { id } => Some(format!(
                "No task with ID '{id}'. Use `tt project show <slug>` to see task IDs."
            )),

            Self::DuplicateSlug { slug } => Some(format!(
                "Slug '{slug}' is taken. Pick a different project name."
            )),

            Self::TodayListFull => Some(
                "Free a slot first:\n  \
                 Complete: tt task status <id> done\n  \
                 Move:     tt task focus <id> week"
                    .to_string(),
            ),

            Self::InvalidArgument(msg) => {
                if msg.contains("status") {
                    Some(
                        "Task statuses: todo, in_progress, done, blocked. \
                         Project statuses: active, blocked, completed, planning. \
                         Synonyms: wip→in_progress, finished→done"
                            .to_string(),
                    )
                } else if msg.contains("priority") {
                    Some("Valid priorities: high, medium, low".to_string())
                } else if msg.contains("list") {
                    Some("Valid focus lists: today, this_week (or: week), backlog (or: none)".to_string())
                } else {
                    None
                }
            }

            Self::Database(_) | Self::Io(_) | Self::Json(_) | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint. Agents parse this instead of stderr text.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NotInitialized.exit_code(), 2);
        assert_eq!(
            Error::ProjectNotFound { slug: "x".into() }.exit_code(),
            3
        );
        assert_eq!(Error::InvalidArgument("bad status".into()).exit_code(), 4);
        assert_eq!(Error::TodayListFull.exit_code(), 5);
    }

    #[test]
    fn test_today_full_message_is_stable() {
        // The capacity message is part of the CLI contract.
        assert_eq!(
            Error::TodayListFull.to_string(),
            "TODAY list is full (max 3). Complete or move a task first."
        );
    }

    #[test]
    fn test_structured_json_shape() {
        let json = Error::TodayListFull.to_structured_json();
        assert_eq!(json["error"]["code"], "TODAY_LIST_FULL");
        assert_eq!(json["error"]["exit_code"], 5);
        assert_eq!(json["error"]["retryable"], true);
        assert!(json["error"]["hint"].is_string());
    }
}
