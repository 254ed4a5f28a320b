//! Project model.
//!
//! Projects are the top-level grouping: each owns an ordered list of tasks
//! and carries a URL-safe slug derived from its display name.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Blocked,
    Completed,
    Planning,
}

impl ProjectStatus {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Completed => "completed",
            Self::Planning => "planning",
        }
    }

    /// Parse a stored status string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "blocked" => Some(Self::Blocked),
            "completed" => Some(Self::Completed),
            "planning" => Some(Self::Planning),
            _ => None,
        }
    }
}

/// Project priority, used to order the cross-project next-task scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parse a stored priority string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Sort rank for the next-task scan: high before medium before low.
    #[must_use]
    pub const fn rank(&self) -> i32 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// A tracked project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier (`proj_` + 12 hex chars)
    pub id: String,

    /// Display name
    pub name: String,

    /// URL-safe identifier derived from the name at creation
    pub slug: String,

    /// Free-form description
    pub description: String,

    pub status: ProjectStatus,

    pub priority: Priority,

    /// Manual display position, assigned as the project count at creation
    pub sort_order: i64,

    /// Local working-copy path, if any
    pub local_path: Option<String>,

    /// Repository path, if any
    pub github_path: Option<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Project {
    /// Create a new project record with a derived slug.
    ///
    /// `sort_order` is the caller's current project count; status defaults
    /// to active.
    #[must_use]
    pub fn new(name: &str, description: &str, priority: Priority, sort_order: i64) -> Self {
        Self {
            id: super::new_id("proj"),
            name: name.to_string(),
            slug: slugify(name),
            description: description.to_string(),
            status: ProjectStatus::Active,
            priority,
            sort_order,
            local_path: None,
            github_path: None,
            created_at: super::now_ms(),
        }
    }
}

/// A project augmented with task-count aggregates for list views.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithStats {
    #[serde(flatten)]
    pub project: Project,
    pub total_tasks: i64,
    pub done_tasks: i64,
    pub completion_percent: i64,
}

impl ProjectWithStats {
    /// Combine a project with its task counts, computing the percentage.
    #[must_use]
    pub fn new(project: Project, total_tasks: i64, done_tasks: i64) -> Self {
        let completion_percent = completion_percent(done_tasks, total_tasks);
        Self {
            project,
            total_tasks,
            done_tasks,
            completion_percent,
        }
    }
}

/// `round(100 * done / total)`, or 0 when there are no tasks.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn completion_percent(done: i64, total: i64) -> i64 {
    if total > 0 {
        (done as f64 / total as f64 * 100.0).round() as i64
    } else {
        0
    }
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercase, whitespace runs collapse to a single hyphen, and any
/// character outside `[A-Za-z0-9_-]` is stripped.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Jocril E-commerce"), "jocril-e-commerce");
        assert_eq!(slugify("Take It Down!!"), "take-it-down");
        assert_eq!(slugify("  DARVO   Transcripts "), "darvo-transcripts");
        assert_eq!(slugify("snake_case name"), "snake_case-name");
    }

    #[test]
    fn test_completion_percent() {
        assert_eq!(completion_percent(1, 4), 25);
        assert_eq!(completion_percent(0, 0), 0);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(3, 3), 100);
    }

    #[test]
    fn test_new_project_defaults() {
        let project = Project::new("My Project", "desc", Priority::High, 4);
        assert!(project.id.starts_with("proj_"));
        assert_eq!(project.slug, "my-project");
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.sort_order, 4);
    }

    #[test]
    fn test_priority_rank_ordering() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }
}
