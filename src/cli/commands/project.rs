//! Project command implementations.

use super::{invalid, open_storage, progress_bar, require_project};
use crate::cli::ProjectCommands;
use crate::error::Result;
use crate::model::{ProjectStatus, TaskStatus};
use crate::validate::{normalize_priority, normalize_project_status};
use crate::{csv_escape, is_csv, is_silent};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Output for project create.
#[derive(Serialize)]
struct ProjectCreateOutput {
    id: String,
    name: String,
    slug: String,
    status: ProjectStatus,
    sort_order: i64,
}

/// Execute project commands.
pub fn execute(command: &ProjectCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    match command {
        ProjectCommands::Create {
            name,
            description,
            priority,
            local_path,
            github_path,
        } => create(
            name,
            description,
            priority,
            local_path.as_deref(),
            github_path.as_deref(),
            db_path,
            json,
        ),
        ProjectCommands::List => list(db_path, json),
        ProjectCommands::Show { slug } => show(slug, db_path, json),
        ProjectCommands::Status { slug, status } => set_status(slug, status, db_path, json),
    }
}

fn create(
    name: &str,
    description: &str,
    priority: &str,
    local_path: Option<&str>,
    github_path: Option<&str>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let priority = normalize_priority(priority).map_err(|e| invalid("priority", e))?;

    let mut storage = open_storage(db_path)?;
    let project = storage.create_project(name, description, priority, local_path, github_path)?;

    if is_silent() {
        println!("{}", project.id);
        return Ok(());
    }

    if json {
        let output = ProjectCreateOutput {
            id: project.id,
            name: project.name,
            slug: project.slug,
            status: project.status,
            sort_order: project.sort_order,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Created project: {} [{}]", project.name, project.slug);
        println!("  Priority: {}", project.priority.as_str());
        println!("  Add a task: tt task add {} \"My first task\"", project.slug);
    }

    Ok(())
}

fn list(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let projects = storage.list_projects()?;

    if json {
        let output = serde_json::json!({
            "count": projects.len(),
            "projects": projects,
        });
        println!("{output}");
        return Ok(());
    }

    if is_csv() {
        println!("slug,name,status,priority,done_tasks,total_tasks,completion_percent");
        for p in &projects {
            println!(
                "{},{},{},{},{},{},{}",
                csv_escape(&p.project.slug),
                csv_escape(&p.project.name),
                p.project.status.as_str(),
                p.project.priority.as_str(),
                p.done_tasks,
                p.total_tasks,
                p.completion_percent
            );
        }
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects yet. Create one: tt project create \"My Project\"");
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:<7} {:<15} {}",
        "SLUG", "STATUS", "PRI", "PROGRESS", "TASKS"
    );
    for p in &projects {
        println!(
            "{:<24} {:<10} {:<7} {} {:>3}% {}/{}",
            p.project.slug,
            colorize_status(p.project.status),
            p.project.priority.as_str(),
            progress_bar(p.completion_percent),
            p.completion_percent,
            p.done_tasks,
            p.total_tasks
        );
    }

    Ok(())
}

fn show(slug: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let project = require_project(&storage, slug)?;
    let tasks = storage.list_tasks_by_project(&project.id)?;

    if json {
        let output = serde_json::json!({
            "project": project,
            "tasks": tasks,
        });
        println!("{output}");
        return Ok(());
    }

    println!("{} [{}]", project.name.bold(), project.slug);
    if !project.description.is_empty() {
        println!("  {}", project.description);
    }
    println!(
        "  Status: {}  Priority: {}",
        colorize_status(project.status),
        project.priority.as_str()
    );
    if let Some(path) = &project.local_path {
        println!("  Local: {path}");
    }
    if let Some(path) = &project.github_path {
        println!("  GitHub: {path}");
    }

    if tasks.is_empty() {
        println!("\nNo tasks. Add one: tt task add {slug} \"My first task\"");
        return Ok(());
    }

    println!();
    for t in &tasks {
        let marker = status_marker(t.task.status);
        print!("  {marker} {}  {}", t.task.id.dimmed(), t.task.title);
        if let Some(reason) = &t.task.blocked_reason {
            print!("  ({reason})");
        }
        if t.total_subtasks > 0 {
            print!("  [{}/{}]", t.done_subtasks, t.total_subtasks);
        }
        println!();
        for sub in &t.subtasks {
            let check = if sub.done { "☑" } else { "☐" };
            println!("      {check} {}  {}", sub.id.dimmed(), sub.title);
        }
    }

    Ok(())
}

fn set_status(slug: &str, status: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let status = normalize_project_status(status).map_err(|e| invalid("project status", e))?;

    let mut storage = open_storage(db_path)?;
    let applied = storage.set_project_status(slug, status)?;

    if json {
        let output = serde_json::json!({
            "slug": slug,
            "status": status,
            "applied": applied,
        });
        println!("{output}");
    } else if applied {
        println!("{slug} → {}", status.as_str());
    } else {
        println!("No project matching '{slug}' (nothing changed)");
    }

    Ok(())
}

pub(crate) fn colorize_status(status: ProjectStatus) -> String {
    match status {
        ProjectStatus::Active => status.as_str().green().to_string(),
        ProjectStatus::Blocked => status.as_str().red().to_string(),
        ProjectStatus::Completed => status.as_str().blue().to_string(),
        ProjectStatus::Planning => status.as_str().yellow().to_string(),
    }
}

pub(crate) fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "○",
        TaskStatus::InProgress => "◐",
        TaskStatus::Done => "●",
        TaskStatus::Blocked => "✗",
    }
}
