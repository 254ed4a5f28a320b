//! Activity log command implementations.

use super::open_storage;
use crate::cli::LogCommands;
use crate::error::Result;
use crate::{csv_escape, is_csv};
use chrono::{Local, TimeZone};
use colored::Colorize;
use std::path::PathBuf;

/// Execute log commands.
pub fn execute(command: &LogCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        LogCommands::List { limit } => list(*limit, db_path, json),
        LogCommands::Add {
            action,
            description,
            project,
            task,
        } => add(
            action,
            description,
            project.as_deref(),
            task.as_deref(),
            db_path,
            json,
        ),
        LogCommands::Clear { force } => clear(*force, db_path, json),
    }
}

fn list(limit: u32, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let entries = storage.list_logs(Some(limit))?;

    if json {
        let output = serde_json::json!({
            "count": entries.len(),
            "entries": entries,
        });
        println!("{output}");
        return Ok(());
    }

    if is_csv() {
        println!("timestamp,action,description");
        for e in &entries {
            println!(
                "{},{},{}",
                e.timestamp,
                csv_escape(&e.action),
                csv_escape(&e.description)
            );
        }
        return Ok(());
    }

    if entries.is_empty() {
        println!("No activity yet");
        return Ok(());
    }

    for e in &entries {
        println!(
            "{} {:<18} {}",
            format_timestamp(e.timestamp).dimmed(),
            e.action,
            e.description
        );
    }

    Ok(())
}

fn add(
    action: &str,
    description: &str,
    project: Option<&str>,
    task: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let id = storage.append_log(project, task, action, description)?;

    if json {
        let output = serde_json::json!({ "id": id });
        println!("{output}");
    } else {
        println!("Logged [{id}]");
    }

    Ok(())
}

fn clear(force: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;

    if !force {
        let count = storage.list_logs(Some(u32::MAX))?.len();
        if json {
            let output = serde_json::json!({
                "cleared": false,
                "entries": count,
                "hint": "re-run with --force",
            });
            println!("{output}");
        } else {
            println!("This would delete all {count} log entries. Re-run with --force.");
        }
        return Ok(());
    }

    let cleared = storage.clear_logs()?;

    if json {
        let output = serde_json::json!({ "cleared": true, "entries": cleared });
        println!("{output}");
    } else {
        println!("Cleared {cleared} log entries");
    }

    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map_or_else(|| ms.to_string(), |dt| dt.format("%m-%d %H:%M").to_string())
}
