//! Configuration management.
//!
//! Resolves where the tracker database lives:
//! 1. An explicit `--db` path (or `TT_DB`, handled by clap)
//! 2. The isolated test database when `TT_TEST_DB` is set
//! 3. The global default, `~/.tasktrack/data/tasktrack.db`
//!
//! A single global database keeps every project visible from anywhere;
//! there is no per-directory discovery.

use std::path::{Path, PathBuf};

/// Get the global tracker directory location (`~/.tasktrack`).
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".tasktrack"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `TT_TEST_DB=1` (or any non-empty value).
/// This redirects all database operations to an isolated test database.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("TT_TEST_DB")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

/// Get the test database path (`~/.tasktrack/test/tasktrack.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("test").join("tasktrack.db"))
}

/// Get the default database path (`~/.tasktrack/data/tasktrack.db`).
#[must_use]
pub fn default_db_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("data").join("tasktrack.db"))
}

/// Resolve the database path from an optional explicit override.
///
/// Explicit path wins; then the test-mode redirect; then the global
/// default.
#[must_use]
pub fn resolve_db_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    default_db_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/custom.db");
        assert_eq!(
            resolve_db_path(Some(&explicit)),
            Some(PathBuf::from("/tmp/custom.db"))
        );
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_db_path() {
            assert!(path.ends_with(".tasktrack/data/tasktrack.db"));
        }
    }
}
