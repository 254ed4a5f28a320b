//! Subtask command implementations.

use super::open_storage;
use crate::cli::SubtaskCommands;
use crate::error::Result;
use crate::is_silent;
use std::path::PathBuf;

/// Execute subtask commands.
pub fn execute(command: &SubtaskCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        SubtaskCommands::Add { task_id, title } => add(task_id, title, db_path, json),
        SubtaskCommands::Toggle { id } => toggle(id, db_path, json),
    }
}

fn add(task_id: &str, title: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let subtask = storage.create_subtask(task_id, title)?;

    if is_silent() {
        println!("{}", subtask.id);
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string(&subtask)?);
    } else {
        println!("Added subtask \"{}\" [{}]", subtask.title, subtask.id);
    }

    Ok(())
}

fn toggle(id: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let new_done = storage.toggle_subtask(id)?;

    if json {
        let output = serde_json::json!({
            "id": id,
            "done": new_done,
            "applied": new_done.is_some(),
        });
        println!("{output}");
        return Ok(());
    }

    match new_done {
        Some(true) => println!("☑️ Checked {id}"),
        Some(false) => println!("⬜ Unchecked {id}"),
        None => println!("No subtask matching '{id}' (nothing changed)"),
    }

    Ok(())
}
