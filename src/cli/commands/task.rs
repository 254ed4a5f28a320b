//! Task command implementations.

use super::{invalid, open_storage, project_not_found, require_project};
use crate::cli::TaskCommands;
use crate::error::{Error, Result};
use crate::model::{now_ms, ListPriority, TaskStatus, WEEK_MS};
use crate::is_silent;
use crate::validate::{normalize_list_priority, normalize_task_status};
use serde::Serialize;
use std::path::PathBuf;

/// Output for task create.
#[derive(Serialize)]
struct TaskCreateOutput {
    id: String,
    title: String,
    project_slug: String,
    status: TaskStatus,
    list_priority: Option<ListPriority>,
    sort_order: i64,
}

/// Execute task commands.
pub fn execute(command: &TaskCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        TaskCommands::Add {
            slug,
            title,
            description,
            ai_prompt,
            list,
        } => add(
            slug,
            title,
            description.as_deref(),
            ai_prompt.as_deref(),
            list.as_deref(),
            db_path,
            json,
        ),
        TaskCommands::Status { id, status, reason } => {
            set_status(id, status, reason.as_deref(), db_path, json)
        }
        TaskCommands::Focus { id, list } => focus(id, list, db_path, json),
        TaskCommands::Archive => archive(db_path, json),
    }
}

fn add(
    slug: &str,
    title: &str,
    description: Option<&str>,
    ai_prompt: Option<&str>,
    list: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let list_priority = match list {
        Some(l) => normalize_list_priority(l).map_err(|e| invalid("list", e))?,
        None => None,
    };

    let mut storage = open_storage(db_path)?;
    let project = require_project(&storage, slug)?;
    let task = storage.create_task(&project, title, description, ai_prompt, list_priority)?;

    if is_silent() {
        println!("{}", task.id);
        return Ok(());
    }

    if json {
        let output = TaskCreateOutput {
            id: task.id,
            title: task.title,
            project_slug: project.slug,
            status: task.status,
            list_priority: task.list_priority,
            sort_order: task.sort_order,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Added \"{}\" to {} [{}]", task.title, project.name, task.id);
        if let Some(lp) = task.list_priority {
            println!("  Focus: {}", lp.as_str());
        }
    }

    Ok(())
}

/// Quick-add handler for the top-level `tt quick` shortcut.
pub fn quick(slug: &str, title: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;

    let task = match storage.quick_add(slug, title) {
        Ok(task) => task,
        Err(Error::ProjectNotFound { slug }) => {
            return Err(project_not_found(&storage, &slug));
        }
        Err(e) => return Err(e),
    };

    if is_silent() {
        println!("{}", task.id);
        return Ok(());
    }

    if json {
        let output = serde_json::json!({
            "id": task.id,
            "title": task.title,
            "project_slug": slug,
        });
        println!("{output}");
    } else {
        println!("Added \"{}\" to {slug} [{}]", task.title, task.id);
    }

    Ok(())
}

fn set_status(
    id: &str,
    status: &str,
    reason: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let status = normalize_task_status(status).map_err(|e| invalid("status", e))?;

    let mut storage = open_storage(db_path)?;
    let applied = storage.set_task_status(id, status, reason)?;

    if json {
        let output = serde_json::json!({
            "id": id,
            "status": status,
            "applied": applied,
        });
        println!("{output}");
    } else if applied {
        match status {
            TaskStatus::Done => println!("✅ Completed {id}"),
            TaskStatus::InProgress => println!("▶️ Started {id}"),
            TaskStatus::Blocked => println!("🔴 Blocked {id}"),
            TaskStatus::Todo => println!("{id} → {}", status.label()),
        }
    } else {
        println!("No task matching '{id}' (nothing changed)");
    }

    Ok(())
}

fn focus(id: &str, list: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let priority = normalize_list_priority(list).map_err(|e| invalid("list", e))?;

    let mut storage = open_storage(db_path)?;
    let applied = storage.set_list_priority(id, priority)?;

    if json {
        let output = serde_json::json!({
            "id": id,
            "list_priority": priority,
            "applied": applied,
        });
        println!("{output}");
    } else if applied {
        match priority {
            Some(p) => println!("📌 {id} → {}", p.label()),
            None => println!("📤 {id} → Backlog"),
        }
    } else {
        println!("No task matching '{id}' (nothing changed)");
    }

    Ok(())
}

fn archive(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;
    let archived = storage.archive_done_before(now_ms() - WEEK_MS)?;

    if json {
        let output = serde_json::json!({ "archived": archived });
        println!("{output}");
    } else if archived == 0 {
        println!("Nothing to archive");
    } else {
        println!("Archived {archived} task(s) completed more than a week ago");
    }

    Ok(())
}
