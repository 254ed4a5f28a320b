//! Composed view commands: the daily focus dashboard, focus lists,
//! the done-this-week list, the next-task pick, and the per-project
//! board.

use super::{open_storage, require_project};
use crate::cli::commands::project::status_marker;
use crate::error::Result;
use crate::model::{now_ms, FocusTask, ListPriority, TaskStatus, TODAY_CAPACITY, WEEK_MS};
use crate::{csv_escape, is_csv};
use colored::Colorize;
use std::path::PathBuf;

/// `tt today`: the daily planning dashboard.
pub fn today(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let today_tasks = storage.list_by_list_priority(ListPriority::Today)?;
    let week_tasks = storage.list_by_list_priority(ListPriority::ThisWeek)?;
    let next = storage.next_task(None)?;

    if json {
        let output = serde_json::json!({
            "today": today_tasks,
            "today_capacity": TODAY_CAPACITY,
            "this_week": week_tasks,
            "next": next.map(|(project, task)| serde_json::json!({
                "project": project,
                "task": task,
            })),
        });
        println!("{output}");
        return Ok(());
    }

    println!(
        "{} {}/{TODAY_CAPACITY}",
        "TODAY".bold(),
        today_tasks.len()
    );
    if today_tasks.is_empty() {
        println!("  (empty; pick up to {TODAY_CAPACITY} with: tt task focus <id> today)");
    } else {
        print_focus_tasks(&today_tasks);
    }

    println!("\n{}", "THIS WEEK".bold());
    if week_tasks.is_empty() {
        println!("  (empty)");
    } else {
        print_focus_tasks(&week_tasks);
    }

    if let Some((project, task)) = next {
        println!("\n{} {} ({})", "NEXT".bold(), task.title, project.name);
    }

    Ok(())
}

/// `tt week`: the THIS WEEK focus list.
pub fn week(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let tasks = storage.list_by_list_priority(ListPriority::ThisWeek)?;

    if json {
        let output = serde_json::json!({
            "count": tasks.len(),
            "this_week": tasks,
        });
        println!("{output}");
        return Ok(());
    }

    if tasks.is_empty() {
        println!("Nothing planned for this week");
        return Ok(());
    }

    print_focus_tasks(&tasks);
    Ok(())
}

/// `tt recent`: tasks completed in the last 7 days, newest first.
pub fn recent(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let done = storage.list_done_since(now_ms() - WEEK_MS)?;

    if json {
        let output = serde_json::json!({
            "count": done.len(),
            "done_this_week": done,
        });
        println!("{output}");
        return Ok(());
    }

    if is_csv() {
        println!("completed_at,project_slug,title");
        for t in &done {
            println!(
                "{},{},{}",
                t.task.completed_at.unwrap_or_default(),
                csv_escape(&t.project_slug),
                csv_escape(&t.task.title)
            );
        }
        return Ok(());
    }

    if done.is_empty() {
        println!("Nothing completed in the last 7 days");
        return Ok(());
    }

    for t in &done {
        println!("✅ {}  {}", t.task.title, format!("({})", t.project_slug).dimmed());
    }

    Ok(())
}

/// `tt next [slug]`: the next task to work on.
pub fn next(slug: Option<&str>, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let picked = storage.next_task(slug)?;

    if json {
        let output = serde_json::json!({
            "next": picked.map(|(project, task)| serde_json::json!({
                "project": project,
                "task": task,
            })),
        });
        println!("{output}");
        return Ok(());
    }

    match picked {
        Some((project, task)) => {
            println!("{} ({}) [{}]", task.title.bold(), project.name, task.id);
            if let Some(description) = &task.description {
                println!("  {description}");
            }
            if let Some(prompt) = &task.ai_prompt {
                println!("  AI prompt: {prompt}");
            }
        }
        None => println!("No open tasks"),
    }

    Ok(())
}

/// `tt board <slug>`: a project's tasks grouped by status column.
pub fn board(slug: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let project = require_project(&storage, slug)?;
    let tasks = storage.list_tasks_by_project(&project.id)?;

    if json {
        let mut columns = serde_json::Map::new();
        for status in [
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ] {
            let column: Vec<_> = tasks.iter().filter(|t| t.task.status == status).collect();
            columns.insert(status.as_str().to_string(), serde_json::to_value(column)?);
        }
        let output = serde_json::json!({
            "project": project,
            "columns": columns,
        });
        println!("{output}");
        return Ok(());
    }

    println!("{} [{}]", project.name.bold(), project.slug);
    for status in [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Blocked,
    ] {
        let column: Vec<_> = tasks.iter().filter(|t| t.task.status == status).collect();
        println!("\n{} ({})", status.label().bold(), column.len());
        for t in column {
            print!("  {} {}  {}", status_marker(status), t.task.id.dimmed(), t.task.title);
            if let Some(reason) = &t.task.blocked_reason {
                print!("  ({reason})");
            }
            if t.total_subtasks > 0 {
                print!("  [{}/{}]", t.done_subtasks, t.total_subtasks);
            }
            println!();
        }
    }

    Ok(())
}

fn print_focus_tasks(tasks: &[FocusTask]) {
    for t in tasks {
        print!(
            "  {} {}  {} {}",
            status_marker(t.task.status),
            t.task.id.dimmed(),
            t.task.title,
            format!("({})", t.project_slug).dimmed()
        );
        if t.total_subtasks > 0 {
            print!("  [{}/{}]", t.done_subtasks, t.total_subtasks);
        }
        println!();
    }
}
