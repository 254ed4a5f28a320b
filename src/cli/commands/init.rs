//! Init command implementation.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::Storage;
use std::path::PathBuf;
use tracing::info;

/// Initialize the tracker database.
///
/// Creates the parent directories and applies the schema. Refuses to
/// touch an existing database unless `--force` is given.
pub fn execute(force: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or_else(|| {
        Error::Other("Could not determine a home directory for the database".to_string())
    })?;

    if path.exists() {
        if !force {
            return Err(Error::AlreadyInitialized { path });
        }
        // WAL siblings go with the database file
        std::fs::remove_file(&path)?;
        for ext in ["-wal", "-shm"] {
            let mut sibling = path.clone().into_os_string();
            sibling.push(ext);
            let sibling = PathBuf::from(sibling);
            if sibling.exists() {
                std::fs::remove_file(&sibling)?;
            }
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Storage::open(&path)?;
    info!(path = %path.display(), "database initialized");

    if json {
        let output = serde_json::json!({
            "initialized": true,
            "path": path.display().to_string(),
        });
        println!("{output}");
    } else {
        println!("Initialized tracker database at {}", path.display());
        println!("  Create a project: tt project create \"My Project\"");
    }

    Ok(())
}
