//! Seed command: populate a demo workspace.
//!
//! Uses the regular mutations, so the seeded data also exercises the
//! activity log. Skipped when any project already exists.

use super::open_storage;
use crate::error::Result;
use crate::model::{ListPriority, Priority, TaskStatus};
use crate::storage::Storage;
use std::path::PathBuf;

/// Execute the seed command.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_storage(db_path)?;

    if !storage.is_empty()? {
        if json {
            println!("{}", serde_json::json!({ "seeded": false, "reason": "not empty" }));
        } else {
            println!("Already seeded, skipping...");
        }
        return Ok(());
    }

    let projects = seed_all(&mut storage)?;

    if json {
        println!("{}", serde_json::json!({ "seeded": true, "projects": projects }));
    } else {
        println!("Seeded {projects} projects with tasks");
        println!("  Try: tt project list");
    }

    Ok(())
}

fn seed_all(storage: &mut Storage) -> Result<usize> {
    // A storefront close to launch, high priority
    let store = storage.create_project(
        "Aurora Storefront",
        "E-commerce store. ~80% complete, closest to launch.",
        Priority::High,
        Some("~/dev/aurora-storefront"),
        None,
    )?;
    for title in [
        "Import products and pricing data",
        "Finalize product catalog structure",
        "Complete checkout flow",
        "Set up order confirmation emails",
        "Deploy to production",
    ] {
        storage.create_task(&store, title, None, None, None)?;
    }

    // A tool mid-build with checklists, high priority
    let reporter = storage.create_project(
        "Complaint Reporter",
        "Privacy complaint tool. 8-week roadmap to beta.",
        Priority::High,
        None,
        Some("projects/complaint-reporter"),
    )?;
    let compliance = storage.create_task(&reporter, "Verify form compliance", None, None, None)?;
    for sub in [
        "Screenshot the target complaint forms",
        "Document character limits for each field",
        "Update templates to match exactly",
    ] {
        storage.create_subtask(&compliance.id, sub)?;
    }
    let pricing = storage.create_task(&reporter, "Define pricing model", None, None, None)?;
    for sub in ["Research competitors", "Propose 3 tiers", "Get community feedback"] {
        storage.create_subtask(&pricing.id, sub)?;
    }
    let redesign = storage.create_task(&reporter, "Redesign application", None, None, None)?;
    storage.set_task_status(&redesign.id, TaskStatus::Blocked, Some("Waiting on designers"))?;

    // A research project, medium priority
    let transcripts = storage.create_project(
        "Transcript Analyzer",
        "Video analysis tool. 6-8 week roadmap.",
        Priority::Medium,
        None,
        None,
    )?;
    storage.create_task(
        &transcripts,
        "Add URL input tab",
        None,
        Some("New tab: accept URLs one per line, names to track, a Start Analysis button."),
        None,
    )?;
    let flagging = storage.create_task(&transcripts, "Build interactive flagging UI", None, None, None)?;
    storage.create_subtask(&flagging.id, "Table with checkboxes")?;
    storage.create_subtask(&flagging.id, "Filter by person/technique")?;

    // A blocked archive project, low priority
    let archive = storage.create_project(
        "Document Archive",
        "Document processing pipeline. BLOCKED: awaiting folder access.",
        Priority::Low,
        None,
        None,
    )?;
    storage.set_project_status(&archive.slug, crate::model::ProjectStatus::Blocked)?;
    storage.create_task(&archive, "Audit existing codebase", None, None, None)?;
    storage.create_task(&archive, "Test OCR engines", None, None, None)?;

    // Give the dashboard something to show
    let first = storage.list_tasks_by_project(&store.id)?;
    storage.set_list_priority(&first[0].task.id, Some(ListPriority::Today))?;
    storage.set_list_priority(&compliance.id, Some(ListPriority::Today))?;
    storage.set_list_priority(&pricing.id, Some(ListPriority::ThisWeek))?;
    storage.set_task_status(&first[1].task.id, TaskStatus::Done, None)?;

    Ok(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_populates_demo_workspace() {
        let mut storage = Storage::open_memory().unwrap();
        assert!(storage.is_empty().unwrap());

        let count = seed_all(&mut storage).unwrap();
        assert_eq!(count, 4);
        assert!(!storage.is_empty().unwrap());

        let projects = storage.list_projects().unwrap();
        assert_eq!(projects.len(), 4);

        // The seeded TODAY list stays under capacity
        assert!(storage.count_today().unwrap() <= crate::model::TODAY_CAPACITY);

        // One blocked project exists for next-task skipping
        assert!(projects
            .iter()
            .any(|p| p.project.status == crate::model::ProjectStatus::Blocked));
    }
}
