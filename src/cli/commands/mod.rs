//! Command implementations.

pub mod completions;
pub mod init;
pub mod log;
pub mod project;
pub mod seed;
pub mod subtask;
pub mod task;
pub mod version;
pub mod views;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::validate::find_similar_slugs;
use std::path::PathBuf;

/// Resolve the database path and open storage, requiring `tt init` to
/// have run.
pub(crate) fn open_storage(db_path: Option<&PathBuf>) -> Result<Storage> {
    let path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;

    if !path.exists() {
        return Err(Error::NotInitialized);
    }

    Storage::open(&path)
}

/// Look up a project by slug, enriching a miss with similar-slug
/// suggestions.
pub(crate) fn require_project(
    storage: &Storage,
    slug: &str,
) -> Result<crate::model::Project> {
    match storage.get_project_by_slug(slug)? {
        Some(project) => Ok(project),
        None => Err(project_not_found(storage, slug)),
    }
}

/// Build the not-found error, with suggestions when close slugs exist.
pub(crate) fn project_not_found(storage: &Storage, slug: &str) -> Error {
    let similar = storage
        .project_slugs()
        .map(|slugs| find_similar_slugs(slug, &slugs, 3))
        .unwrap_or_default();

    if similar.is_empty() {
        Error::ProjectNotFound {
            slug: slug.to_string(),
        }
    } else {
        Error::ProjectNotFoundSimilar {
            slug: slug.to_string(),
            similar,
        }
    }
}

/// Map a normalization failure to an `InvalidArgument` with a suggestion.
pub(crate) fn invalid(kind: &str, (value, suggestion): (String, Option<String>)) -> Error {
    let msg = match suggestion {
        Some(s) => format!("Invalid {kind} '{value}'. Did you mean '{s}'?"),
        None => format!("Invalid {kind} '{value}'"),
    };
    Error::InvalidArgument(msg)
}

/// Render a 10-cell progress bar for a completion percentage.
pub(crate) fn progress_bar(percent: i64) -> String {
    let filled = usize::try_from((percent / 10).clamp(0, 10)).unwrap_or(0);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), "░░░░░░░░░░");
        assert_eq!(progress_bar(25), "██░░░░░░░░");
        assert_eq!(progress_bar(100), "██████████");
    }

    #[test]
    fn test_invalid_message_carries_kind() {
        let err = invalid("status", ("dnoe".to_string(), Some("done".to_string())));
        assert_eq!(
            err.to_string(),
            "Invalid argument: Invalid status 'dnoe'. Did you mean 'done'?"
        );
    }
}
