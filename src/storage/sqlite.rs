//! SQLite storage implementation.
//!
//! All domain operations live here. Writes go through the `mutate()`
//! protocol: an IMMEDIATE transaction in which the mutation closure stages
//! activity-log entries on a `MutationContext`; entries are inserted and
//! the transaction commits atomically. Running the TODAY capacity count
//! inside the same transaction as the conditional write closes the
//! check-then-act race two concurrent callers would otherwise hit.

use crate::error::{Error, Result};
use crate::model::{
    ActionKind, ActionLogEntry, CompletedTask, FocusTask, ListPriority, Priority, Project,
    ProjectStatus, ProjectWithStats, Subtask, Task, TaskStatus, TaskWithSubtasks, TODAY_CAPACITY,
};
use crate::storage::log::{clear_entries, insert_entry, list_entries};
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

/// Context for a mutation operation, tracking side effects.
///
/// Passed to mutation closures so they can stage activity-log entries;
/// the entries are written at the end of the transaction and roll back
/// with it on failure.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Log entries to write at the end of the transaction.
    pub entries: Vec<ActionLogEntry>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Stage an activity-log entry for a structured mutation.
    pub fn record(
        &mut self,
        project_id: Option<&str>,
        task_id: Option<&str>,
        kind: ActionKind,
        description: String,
    ) {
        self.entries
            .push(ActionLogEntry::new(project_id, task_id, kind.as_str(), description));
    }
}

fn map_project_row(row: &Row) -> rusqlite::Result<Project> {
    let status_s: String = row.get(4)?;
    let priority_s: String = row.get(5)?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        status: ProjectStatus::parse(&status_s).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown project status: {status_s}").into(),
            )
        })?,
        priority: Priority::parse(&priority_s).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("unknown priority: {priority_s}").into(),
            )
        })?,
        sort_order: row.get(6)?,
        local_path: row.get(7)?,
        github_path: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn map_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status_s: String = row.get(4)?;
    let list_priority_s: Option<String> = row.get(5)?;
    Ok(Task {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: TaskStatus::parse(&status_s).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown task status: {status_s}").into(),
            )
        })?,
        list_priority: list_priority_s.as_deref().and_then(ListPriority::parse),
        ai_prompt: row.get(6)?,
        blocked_reason: row.get(7)?,
        sort_order: row.get(8)?,
        completed_at: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn map_subtask_row(row: &Row) -> rusqlite::Result<Subtask> {
    Ok(Subtask {
        id: row.get(0)?,
        task_id: row.get(1)?,
        title: row.get(2)?,
        done: row.get(3)?,
        sort_order: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const PROJECT_COLS: &str =
    "id, name, slug, description, status, priority, sort_order, local_path, github_path, created_at";

const TASK_COLS: &str = "id, project_id, title, description, status, list_priority, ai_prompt, \
     blocked_reason, sort_order, completed_at, created_at";

const SUBTASK_COLS: &str = "id, task_id, title, done, sort_order, created_at";

impl Storage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes staged activity-log entries
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        for entry in &ctx.entries {
            insert_entry(&tx, entry)?;
        }

        tx.commit()?;
        debug!(op, logged = ctx.entries.len(), "mutation committed");

        Ok(result)
    }

    // ==================
    // Project Operations
    // ==================

    /// Create a new project.
    ///
    /// The slug is derived from the name; `sort_order` is the project count
    /// at insert time; status starts as active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSlug`] if a project with the derived slug
    /// already exists.
    pub fn create_project(
        &mut self,
        name: &str,
        description: &str,
        priority: Priority,
        local_path: Option<&str>,
        github_path: Option<&str>,
    ) -> Result<Project> {
        let mut project = Project::new(name, description, priority, 0);
        project.local_path = local_path.map(ToString::to_string);
        project.github_path = github_path.map(ToString::to_string);

        self.mutate("create_project", |tx, ctx| {
            let taken = tx
                .prepare("SELECT 1 FROM projects WHERE slug = ?1")?
                .exists([&project.slug])?;
            if taken {
                return Err(Error::DuplicateSlug {
                    slug: project.slug.clone(),
                });
            }

            project.sort_order =
                tx.query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))?;

            tx.execute(
                "INSERT INTO projects (id, name, slug, description, status, priority, sort_order, local_path, github_path, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    project.id,
                    project.name,
                    project.slug,
                    project.description,
                    project.status.as_str(),
                    project.priority.as_str(),
                    project.sort_order,
                    project.local_path,
                    project.github_path,
                    project.created_at,
                ],
            )?;

            ctx.record(
                None,
                None,
                ActionKind::ProjectCreated,
                format!("Initialized new active core: {}", project.name),
            );

            Ok(())
        })?;

        Ok(project)
    }

    /// List all projects with computed task-count stats, ordered by
    /// `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_projects(&self) -> Result<Vec<ProjectWithStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, p.slug, p.description, p.status, p.priority, p.sort_order,
                    p.local_path, p.github_path, p.created_at,
                    COUNT(t.id) AS total_tasks,
                    COUNT(CASE WHEN t.status = 'done' THEN 1 END) AS done_tasks
             FROM projects p
             LEFT JOIN tasks t ON t.project_id = p.id
             GROUP BY p.id
             ORDER BY p.sort_order ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let project = map_project_row(row)?;
            let total: i64 = row.get(10)?;
            let done: i64 = row.get(11)?;
            Ok(ProjectWithStats::new(project, total, done))
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Indexed point lookup by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_project_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLS} FROM projects WHERE slug = ?1"
        ))?;

        stmt.query_row([slug], map_project_row)
            .optional()
            .map_err(Error::from)
    }

    /// All project slugs, for similar-slug suggestions on lookup misses.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn project_slugs(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug FROM projects ORDER BY sort_order ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Patch a project's status (matched by id or slug).
    ///
    /// Returns false (no-op) when the project is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_project_status(&mut self, id_or_slug: &str, status: ProjectStatus) -> Result<bool> {
        self.mutate("set_project_status", |tx, _ctx| {
            let rows = tx.execute(
                "UPDATE projects SET status = ?1 WHERE id = ?2 OR slug = ?2",
                rusqlite::params![status.as_str(), id_or_slug],
            )?;
            Ok(rows > 0)
        })
    }

    // ==================
    // Task Operations
    // ==================

    /// Create a task under a project.
    ///
    /// When `list_priority` is TODAY the capacity check (max 3) runs inside
    /// the transaction before the insert. `sort_order` is the project's
    /// task count at insert time; status starts as todo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TodayListFull`] when the TODAY list is at capacity.
    pub fn create_task(
        &mut self,
        project: &Project,
        title: &str,
        description: Option<&str>,
        ai_prompt: Option<&str>,
        list_priority: Option<ListPriority>,
    ) -> Result<Task> {
        let mut task = Task::new(&project.id, title, 0);
        task.description = description.map(ToString::to_string);
        task.ai_prompt = ai_prompt.map(ToString::to_string);
        task.list_priority = list_priority;

        self.mutate("create_task", |tx, ctx| {
            if list_priority == Some(ListPriority::Today) {
                let today: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM tasks WHERE list_priority = 'today'",
                    [],
                    |r| r.get(0),
                )?;
                if today >= TODAY_CAPACITY {
                    return Err(Error::TodayListFull);
                }
            }

            task.sort_order = tx.query_row(
                "SELECT COUNT(*) FROM tasks WHERE project_id = ?1",
                [&project.id],
                |r| r.get(0),
            )?;

            insert_task(tx, &task)?;

            ctx.record(
                Some(&project.id),
                Some(&task.id),
                ActionKind::Created,
                format!("➕ Added \"{}\" to {}", task.title, project.name),
            );

            Ok(())
        })?;

        Ok(task)
    }

    /// Resolve a project by slug and create a bare todo task under it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] when the slug doesn't match.
    pub fn quick_add(&mut self, project_slug: &str, title: &str) -> Result<Task> {
        let project = self
            .get_project_by_slug(project_slug)?
            .ok_or_else(|| Error::ProjectNotFound {
                slug: project_slug.to_string(),
            })?;

        self.create_task(&project, title, None, None, None)
    }

    /// All tasks for a project, each with its ordered subtasks and counts,
    /// ordered by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tasks_by_project(&self, project_id: &str) -> Result<Vec<TaskWithSubtasks>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLS} FROM tasks WHERE project_id = ?1 ORDER BY sort_order ASC"
        ))?;
        let tasks = stmt
            .query_map([project_id], map_task_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(tasks.len());
        for task in tasks {
            let subtasks = self.subtasks_for(&task.id)?;
            out.push(TaskWithSubtasks::new(task, subtasks));
        }
        Ok(out)
    }

    /// The focus list for one priority bucket, each task augmented with
    /// its project's name/slug and subtasks, ordered by `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_by_list_priority(&self, priority: ListPriority) -> Result<Vec<FocusTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLS_T}, p.name, p.slug
             FROM tasks t JOIN projects p ON p.id = t.project_id
             WHERE t.list_priority = ?1
             ORDER BY t.sort_order ASC",
            TASK_COLS_T = task_cols_prefixed()
        ))?;

        let rows = stmt
            .query_map([priority.as_str()], |row| {
                let task = map_task_row(row)?;
                let project_name: String = row.get(11)?;
                let project_slug: String = row.get(12)?;
                Ok((task, project_name, project_slug))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (task, project_name, project_slug) in rows {
            let subtasks = self.subtasks_for(&task.id)?;
            let total_subtasks = subtasks.len() as i64;
            let done_subtasks = subtasks.iter().filter(|s| s.done).count() as i64;
            out.push(FocusTask {
                task,
                project_name,
                project_slug,
                subtasks,
                total_subtasks,
                done_subtasks,
            });
        }
        Ok(out)
    }

    /// Tasks completed after `since_ms`, newest completion first, with
    /// project name/slug attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_done_since(&self, since_ms: i64) -> Result<Vec<CompletedTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLS_T}, p.name, p.slug
             FROM tasks t JOIN projects p ON p.id = t.project_id
             WHERE t.status = 'done' AND t.completed_at IS NOT NULL AND t.completed_at > ?1
             ORDER BY t.completed_at DESC",
            TASK_COLS_T = task_cols_prefixed()
        ))?;

        let rows = stmt.query_map([since_ms], |row| {
            let task = map_task_row(row)?;
            let project_name: String = row.get(11)?;
            let project_slug: String = row.get(12)?;
            Ok(CompletedTask {
                task,
                project_name,
                project_slug,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Get a task by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLS} FROM tasks WHERE id = ?1"))?;
        stmt.query_row([id], map_task_row)
            .optional()
            .map_err(Error::from)
    }

    /// Patch a task's status, with the done-transition side effects and a
    /// status-specific log entry.
    ///
    /// `blocked_reason` always overwrites the stored value: it is set when
    /// blocking with a reason and cleared on every other transition. On
    /// `done`, `completed_at` is stamped and the task leaves its focus
    /// list.
    ///
    /// Returns false (no-op) when the task is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn set_task_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        blocked_reason: Option<&str>,
    ) -> Result<bool> {
        self.mutate("set_task_status", |tx, ctx| {
            let Some(task) = find_task(tx, id)? else {
                return Ok(false);
            };

            if status == TaskStatus::Done {
                tx.execute(
                    "UPDATE tasks SET status = ?1, blocked_reason = ?2,
                            completed_at = ?3, list_priority = NULL
                     WHERE id = ?4",
                    rusqlite::params![
                        status.as_str(),
                        blocked_reason,
                        crate::model::now_ms(),
                        task.id
                    ],
                )?;
            } else {
                tx.execute(
                    "UPDATE tasks SET status = ?1, blocked_reason = ?2 WHERE id = ?3",
                    rusqlite::params![status.as_str(), blocked_reason, task.id],
                )?;
            }

            let (kind, description) = match status {
                TaskStatus::Done => (
                    ActionKind::Completed,
                    format!("✅ Completed \"{}\"", task.title),
                ),
                TaskStatus::InProgress => (
                    ActionKind::Started,
                    format!("▶️ Started \"{}\"", task.title),
                ),
                TaskStatus::Blocked => (
                    ActionKind::Blocked,
                    match blocked_reason {
                        Some(reason) => format!("🔴 Blocked \"{}\": {reason}", task.title),
                        None => format!("🔴 Blocked \"{}\"", task.title),
                    },
                ),
                TaskStatus::Todo => (
                    ActionKind::Updated,
                    format!("\"{}\" → {}", task.title, status.label()),
                ),
            };
            ctx.record(Some(&task.project_id), Some(&task.id), kind, description);

            Ok(true)
        })
    }

    /// Move a task between focus lists (`None` = back to backlog).
    ///
    /// Assigning TODAY counts the list's other members inside the
    /// transaction and rejects the move at capacity; a task already on
    /// TODAY never blocks itself.
    ///
    /// Returns false (no-op) when the task is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TodayListFull`] when the TODAY list is at capacity.
    pub fn set_list_priority(&mut self, id: &str, priority: Option<ListPriority>) -> Result<bool> {
        self.mutate("set_list_priority", |tx, ctx| {
            let Some(task) = find_task(tx, id)? else {
                return Ok(false);
            };

            if priority == Some(ListPriority::Today) {
                let others: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM tasks WHERE list_priority = 'today' AND id != ?1",
                    [&task.id],
                    |r| r.get(0),
                )?;
                if others >= TODAY_CAPACITY {
                    return Err(Error::TodayListFull);
                }
            }

            tx.execute(
                "UPDATE tasks SET list_priority = ?1 WHERE id = ?2",
                rusqlite::params![priority.map(|p| p.as_str()), task.id],
            )?;

            let description = match priority {
                Some(p) => format!("📌 \"{}\" → {}", task.title, p.label()),
                None => format!("📤 \"{}\" → Backlog", task.title),
            };
            ctx.record(
                Some(&task.project_id),
                Some(&task.id),
                ActionKind::Prioritized,
                description,
            );

            Ok(true)
        })
    }

    /// Pick the next task to work on.
    ///
    /// With a slug, only that project is considered (an unmatched slug
    /// yields none). Otherwise projects are scanned in priority order
    /// (high, medium, low; ties in insertion order), skipping blocked
    /// projects. The first open task (todo or in_progress) by `sort_order`
    /// in the first eligible project wins.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn next_task(&self, project_slug: Option<&str>) -> Result<Option<(Project, Task)>> {
        let projects: Vec<Project> = if let Some(slug) = project_slug {
            self.get_project_by_slug(slug)?.into_iter().collect()
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {PROJECT_COLS} FROM projects ORDER BY rowid ASC"
            ))?;
            let mut all = stmt
                .query_map([], map_project_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            // Stable sort keeps insertion order within a priority tier
            all.sort_by_key(|p: &Project| p.priority.rank());
            all
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLS} FROM tasks
             WHERE project_id = ?1 AND status IN ('todo', 'in_progress')
             ORDER BY sort_order ASC
             LIMIT 1"
        ))?;

        for project in projects {
            if project.status == ProjectStatus::Blocked {
                continue;
            }

            let candidate = stmt
                .query_row([&project.id], map_task_row)
                .optional()?;

            if let Some(task) = candidate {
                return Ok(Some((project, task)));
            }
        }

        Ok(None)
    }

    /// Clear `completed_at` on done tasks completed before `cutoff_ms`
    /// (status untouched). Returns how many were archived.
    ///
    /// A maintenance sweep; invoked explicitly, never on a schedule of
    /// its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn archive_done_before(&mut self, cutoff_ms: i64) -> Result<usize> {
        let archived = self.mutate("archive_done", |tx, _ctx| {
            let rows = tx.execute(
                "UPDATE tasks SET completed_at = NULL
                 WHERE status = 'done' AND completed_at IS NOT NULL AND completed_at < ?1",
                [cutoff_ms],
            )?;
            Ok(rows)
        })?;

        if archived > 0 {
            info!(archived, "archived old done tasks");
        }
        Ok(archived)
    }

    /// Number of tasks currently on the TODAY list.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_today(&self) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE list_priority = 'today'",
                [],
                |r| r.get(0),
            )
            .map_err(Error::from)
    }

    // ==================
    // Subtask Operations
    // ==================

    /// Create a subtask under a task.
    ///
    /// `sort_order` is the task's subtask count at insert time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] when the task is missing.
    pub fn create_subtask(&mut self, task_id: &str, title: &str) -> Result<Subtask> {
        let mut subtask = Subtask::new(task_id, title, 0);

        self.mutate("create_subtask", |tx, ctx| {
            let Some(task) = find_task(tx, task_id)? else {
                return Err(Error::TaskNotFound {
                    id: task_id.to_string(),
                });
            };

            subtask.sort_order = tx.query_row(
                "SELECT COUNT(*) FROM subtasks WHERE task_id = ?1",
                [&task.id],
                |r| r.get(0),
            )?;

            tx.execute(
                "INSERT INTO subtasks (id, task_id, title, done, sort_order, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    subtask.id,
                    subtask.task_id,
                    subtask.title,
                    subtask.done,
                    subtask.sort_order,
                    subtask.created_at,
                ],
            )?;

            ctx.record(
                Some(&task.project_id),
                Some(&task.id),
                ActionKind::SubtaskCreated,
                format!("➕ Added subtask \"{}\"", subtask.title),
            );

            Ok(())
        })?;

        Ok(subtask)
    }

    /// Flip a subtask's done flag. Returns the new state, or `None`
    /// (no-op) when the subtask is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn toggle_subtask(&mut self, id: &str) -> Result<Option<bool>> {
        self.mutate("toggle_subtask", |tx, ctx| {
            let found = tx
                .query_row(
                    "SELECT s.id, s.title, s.done, t.id, t.project_id
                     FROM subtasks s JOIN tasks t ON t.id = s.task_id
                     WHERE s.id = ?1",
                    [id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, bool>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                )
                .optional()?;

            let Some((subtask_id, title, done, task_id, project_id)) = found else {
                return Ok(None);
            };

            let new_done = !done;
            tx.execute(
                "UPDATE subtasks SET done = ?1 WHERE id = ?2",
                rusqlite::params![new_done, subtask_id],
            )?;

            let (kind, description) = if new_done {
                (
                    ActionKind::SubtaskCompleted,
                    format!("☑️ Checked \"{title}\""),
                )
            } else {
                (
                    ActionKind::SubtaskUnchecked,
                    format!("⬜ Unchecked \"{title}\""),
                )
            };
            ctx.record(Some(&project_id), Some(&task_id), kind, description);

            Ok(Some(new_done))
        })
    }

    /// Subtasks for one task, ordered by `sort_order`.
    fn subtasks_for(&self, task_id: &str) -> Result<Vec<Subtask>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {SUBTASK_COLS} FROM subtasks WHERE task_id = ?1 ORDER BY sort_order ASC"
        ))?;
        let rows = stmt.query_map([task_id], map_subtask_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // ==================
    // Activity Log Operations
    // ==================

    /// Append a log entry directly (the generic escape hatch beyond the
    /// structured mutations). Returns the new row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn append_log(
        &mut self,
        project_id: Option<&str>,
        task_id: Option<&str>,
        action: &str,
        description: &str,
    ) -> Result<i64> {
        let entry = ActionLogEntry::new(project_id, task_id, action, description.to_string());
        self.mutate("append_log", |tx, _ctx| {
            insert_entry(tx, &entry).map_err(Error::from)
        })
    }

    /// Most recent log entries, newest first (default limit 20).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_logs(&self, limit: Option<u32>) -> Result<Vec<ActionLogEntry>> {
        list_entries(&self.conn, limit).map_err(Error::from)
    }

    /// Wipe the activity log. Returns the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear_logs(&mut self) -> Result<usize> {
        self.mutate("clear_logs", |tx, _ctx| {
            clear_entries(tx).map_err(Error::from)
        })
    }

    /// True when no projects exist yet (used by the seed command).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn is_empty(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))?;
        Ok(count == 0)
    }
}

/// Point lookup used by mutations: id, title, project_id are enough for
/// the patch-and-log pattern.
fn find_task(tx: &Transaction, id: &str) -> Result<Option<TaskRef>> {
    tx.query_row(
        "SELECT id, title, project_id FROM tasks WHERE id = ?1",
        [id],
        |row| {
            Ok(TaskRef {
                id: row.get(0)?,
                title: row.get(1)?,
                project_id: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(Error::from)
}

struct TaskRef {
    id: String,
    title: String,
    project_id: String,
}

fn insert_task(tx: &Transaction, task: &Task) -> Result<()> {
    tx.execute(
        "INSERT INTO tasks (id, project_id, title, description, status, list_priority, ai_prompt, blocked_reason, sort_order, completed_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            task.id,
            task.project_id,
            task.title,
            task.description,
            task.status.as_str(),
            task.list_priority.map(|p| p.as_str()),
            task.ai_prompt,
            task.blocked_reason,
            task.sort_order,
            task.completed_at,
            task.created_at,
        ],
    )?;
    Ok(())
}

/// `TASK_COLS` with a `t.` prefix for joined queries.
fn task_cols_prefixed() -> String {
    TASK_COLS
        .split(", ")
        .map(|c| format!("t.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WEEK_MS;

    fn storage() -> Storage {
        Storage::open_memory().unwrap()
    }

    fn project(s: &mut Storage, name: &str, priority: Priority) -> Project {
        s.create_project(name, "", priority, None, None).unwrap()
    }

    fn task(s: &mut Storage, p: &Project, title: &str) -> Task {
        s.create_task(p, title, None, None, None).unwrap()
    }

    /// Backdate a done task's completion time for window tests.
    fn backdate_completion(s: &Storage, task_id: &str, completed_at: i64) {
        s.conn()
            .execute(
                "UPDATE tasks SET completed_at = ?1 WHERE id = ?2",
                rusqlite::params![completed_at, task_id],
            )
            .unwrap();
    }

    #[test]
    fn test_project_order_assignment() {
        let mut s = storage();
        for (i, name) in ["Alpha", "Beta", "Gamma"].iter().enumerate() {
            let p = project(&mut s, name, Priority::Medium);
            assert_eq!(p.sort_order, i as i64);
        }
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut s = storage();
        project(&mut s, "My App", Priority::High);
        let err = s
            .create_project("My  App", "", Priority::Low, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSlug { .. }));
        // The failed create must not leave a log entry behind
        let logs = s.list_logs(None).unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn test_completion_percent_aggregation() {
        let mut s = storage();
        let p = project(&mut s, "Stats", Priority::High);
        let ids: Vec<String> = (0..4).map(|i| task(&mut s, &p, &format!("t{i}")).id).collect();
        s.set_task_status(&ids[0], TaskStatus::Done, None).unwrap();

        let listed = s.list_projects().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total_tasks, 4);
        assert_eq!(listed[0].done_tasks, 1);
        assert_eq!(listed[0].completion_percent, 25);
    }

    #[test]
    fn test_empty_project_is_zero_percent() {
        let mut s = storage();
        project(&mut s, "Empty", Priority::Low);
        let listed = s.list_projects().unwrap();
        assert_eq!(listed[0].completion_percent, 0);
    }

    #[test]
    fn test_task_order_is_per_project() {
        let mut s = storage();
        let a = project(&mut s, "A", Priority::High);
        let b = project(&mut s, "B", Priority::High);
        task(&mut s, &a, "a0");
        task(&mut s, &a, "a1");
        let b0 = task(&mut s, &b, "b0");
        assert_eq!(b0.sort_order, 0);
        let a2 = task(&mut s, &a, "a2");
        assert_eq!(a2.sort_order, 2);
    }

    #[test]
    fn test_done_sets_completed_at_and_clears_focus() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let t = task(&mut s, &p, "ship it");
        s.set_list_priority(&t.id, Some(ListPriority::Today)).unwrap();

        assert!(s.set_task_status(&t.id, TaskStatus::Done, None).unwrap());

        let t = s.get_task(&t.id).unwrap().unwrap();
        assert_eq!(t.status, TaskStatus::Done);
        assert!(t.completed_at.is_some());
        assert_eq!(t.list_priority, None);
        assert!(s.list_by_list_priority(ListPriority::Today).unwrap().is_empty());
    }

    #[test]
    fn test_status_update_on_missing_task_is_noop() {
        let mut s = storage();
        assert!(!s.set_task_status("task_missing", TaskStatus::Done, None).unwrap());
        assert!(s.list_logs(None).unwrap().is_empty());
    }

    #[test]
    fn test_blocked_reason_set_and_cleared() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let t = task(&mut s, &p, "t");

        s.set_task_status(&t.id, TaskStatus::Blocked, Some("waiting on API keys"))
            .unwrap();
        let got = s.get_task(&t.id).unwrap().unwrap();
        assert_eq!(got.blocked_reason.as_deref(), Some("waiting on API keys"));

        s.set_task_status(&t.id, TaskStatus::Todo, None).unwrap();
        let got = s.get_task(&t.id).unwrap().unwrap();
        assert_eq!(got.blocked_reason, None);
    }

    #[test]
    fn test_today_capacity_enforced() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        for i in 0..3 {
            let t = task(&mut s, &p, &format!("t{i}"));
            s.set_list_priority(&t.id, Some(ListPriority::Today)).unwrap();
        }

        let overflow = task(&mut s, &p, "one too many");
        let err = s
            .set_list_priority(&overflow.id, Some(ListPriority::Today))
            .unwrap_err();
        assert!(matches!(err, Error::TodayListFull));

        // create with listPriority=today hits the same wall
        let err = s
            .create_task(&p, "direct", None, None, Some(ListPriority::Today))
            .unwrap_err();
        assert!(matches!(err, Error::TodayListFull));
    }

    #[test]
    fn test_today_capacity_excludes_self() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let mut members = Vec::new();
        for i in 0..3 {
            let t = task(&mut s, &p, &format!("t{i}"));
            s.set_list_priority(&t.id, Some(ListPriority::Today)).unwrap();
            members.push(t);
        }

        // Re-assigning a current member succeeds at 3/3
        assert!(s
            .set_list_priority(&members[0].id, Some(ListPriority::Today))
            .unwrap());
    }

    #[test]
    fn test_focus_roundtrip_to_backlog() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let t = s
            .create_task(&p, "t", None, None, Some(ListPriority::ThisWeek))
            .unwrap();

        assert_eq!(s.list_by_list_priority(ListPriority::ThisWeek).unwrap().len(), 1);

        s.set_list_priority(&t.id, None).unwrap();
        assert!(s.list_by_list_priority(ListPriority::ThisWeek).unwrap().is_empty());
        assert_eq!(s.get_task(&t.id).unwrap().unwrap().list_priority, None);
    }

    #[test]
    fn test_done_this_week_window() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let now = crate::model::now_ms();

        let recent = task(&mut s, &p, "six days ago");
        s.set_task_status(&recent.id, TaskStatus::Done, None).unwrap();
        backdate_completion(&s, &recent.id, now - 6 * 24 * 60 * 60 * 1000);

        let old = task(&mut s, &p, "eight days ago");
        s.set_task_status(&old.id, TaskStatus::Done, None).unwrap();
        backdate_completion(&s, &old.id, now - 8 * 24 * 60 * 60 * 1000);

        let done = s.list_done_since(now - WEEK_MS).unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].task.title, "six days ago");
        assert_eq!(done[0].project_slug, "p");
    }

    #[test]
    fn test_next_task_skips_blocked_high_priority_project() {
        let mut s = storage();
        let high = project(&mut s, "High", Priority::High);
        let medium = project(&mut s, "Medium", Priority::Medium);
        let low = project(&mut s, "Low", Priority::Low);
        s.set_project_status(&high.id, ProjectStatus::Blocked).unwrap();

        task(&mut s, &high, "high todo");
        let expected = task(&mut s, &medium, "medium todo");
        task(&mut s, &low, "low todo");

        let (picked_project, picked_task) = s.next_task(None).unwrap().unwrap();
        assert_eq!(picked_project.id, medium.id);
        assert_eq!(picked_task.id, expected.id);
    }

    #[test]
    fn test_next_task_prefers_first_open_by_order() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let first = task(&mut s, &p, "first");
        task(&mut s, &p, "second");
        s.set_task_status(&first.id, TaskStatus::InProgress, None).unwrap();

        // in_progress counts as open and keeps its earlier order slot
        let (_, picked) = s.next_task(Some("p")).unwrap().unwrap();
        assert_eq!(picked.id, first.id);
    }

    #[test]
    fn test_next_task_unknown_slug_yields_none() {
        let mut s = storage();
        project(&mut s, "P", Priority::High);
        assert!(s.next_task(Some("nope")).unwrap().is_none());
    }

    #[test]
    fn test_next_task_none_when_everything_done() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let t = task(&mut s, &p, "t");
        s.set_task_status(&t.id, TaskStatus::Done, None).unwrap();
        assert!(s.next_task(None).unwrap().is_none());
    }

    #[test]
    fn test_archive_clears_only_old_completions() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let now = crate::model::now_ms();

        let old = task(&mut s, &p, "old");
        s.set_task_status(&old.id, TaskStatus::Done, None).unwrap();
        backdate_completion(&s, &old.id, now - 10 * 24 * 60 * 60 * 1000);

        let fresh = task(&mut s, &p, "fresh");
        s.set_task_status(&fresh.id, TaskStatus::Done, None).unwrap();
        backdate_completion(&s, &fresh.id, now - 2 * 24 * 60 * 60 * 1000);

        let archived = s.archive_done_before(now - WEEK_MS).unwrap();
        assert_eq!(archived, 1);

        let old = s.get_task(&old.id).unwrap().unwrap();
        assert_eq!(old.status, TaskStatus::Done);
        assert_eq!(old.completed_at, None);

        let fresh = s.get_task(&fresh.id).unwrap().unwrap();
        assert!(fresh.completed_at.is_some());
    }

    #[test]
    fn test_quick_add_unknown_project() {
        let mut s = storage();
        let err = s.quick_add("ghost", "title").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }

    #[test]
    fn test_quick_add_logs_creation() {
        let mut s = storage();
        project(&mut s, "Storefront", Priority::High);
        let t = s.quick_add("storefront", "Fix checkout").unwrap();
        assert_eq!(t.status, TaskStatus::Todo);

        let logs = s.list_logs(None).unwrap();
        assert_eq!(logs[0].action, "created");
        assert_eq!(logs[0].description, "➕ Added \"Fix checkout\" to Storefront");
    }

    #[test]
    fn test_subtask_toggle_logs_both_directions() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let t = task(&mut s, &p, "t");
        let sub = s.create_subtask(&t.id, "step one").unwrap();

        assert_eq!(s.toggle_subtask(&sub.id).unwrap(), Some(true));
        assert_eq!(s.toggle_subtask(&sub.id).unwrap(), Some(false));

        let logs = s.list_logs(None).unwrap();
        assert_eq!(logs[0].action, "subtask_unchecked");
        assert_eq!(logs[1].action, "subtask_completed");
    }

    #[test]
    fn test_subtask_toggle_missing_is_noop() {
        let mut s = storage();
        assert_eq!(s.toggle_subtask("sub_missing").unwrap(), None);
    }

    #[test]
    fn test_subtask_requires_task() {
        let mut s = storage();
        let err = s.create_subtask("task_missing", "x").unwrap_err();
        assert!(matches!(err, Error::TaskNotFound { .. }));
    }

    #[test]
    fn test_subtask_order_and_counts() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let t = task(&mut s, &p, "t");
        for i in 0..3 {
            let sub = s.create_subtask(&t.id, &format!("s{i}")).unwrap();
            assert_eq!(sub.sort_order, i);
        }
        let listed = s.list_tasks_by_project(&p.id).unwrap();
        let sub0_id = listed[0].subtasks[0].id.clone();
        s.toggle_subtask(&sub0_id).unwrap();

        let listed = s.list_tasks_by_project(&p.id).unwrap();
        assert_eq!(listed[0].total_subtasks, 3);
        assert_eq!(listed[0].done_subtasks, 1);
    }

    #[test]
    fn test_focus_list_carries_project_fields() {
        let mut s = storage();
        let p = project(&mut s, "Flow Bridge", Priority::High);
        let t = task(&mut s, &p, "t");
        s.set_list_priority(&t.id, Some(ListPriority::Today)).unwrap();

        let today = s.list_by_list_priority(ListPriority::Today).unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].project_name, "Flow Bridge");
        assert_eq!(today[0].project_slug, "flow-bridge");
    }

    #[test]
    fn test_status_log_descriptions() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        let t = task(&mut s, &p, "Deploy");

        s.set_task_status(&t.id, TaskStatus::InProgress, None).unwrap();
        s.set_task_status(&t.id, TaskStatus::Blocked, Some("DNS")).unwrap();
        s.set_task_status(&t.id, TaskStatus::Todo, None).unwrap();
        s.set_task_status(&t.id, TaskStatus::Done, None).unwrap();

        let logs = s.list_logs(Some(4)).unwrap();
        assert_eq!(logs[0].description, "✅ Completed \"Deploy\"");
        assert_eq!(logs[1].description, "\"Deploy\" → To Do");
        assert_eq!(logs[2].description, "🔴 Blocked \"Deploy\": DNS");
        assert_eq!(logs[3].description, "▶️ Started \"Deploy\"");
    }

    #[test]
    fn test_project_status_patch_by_slug() {
        let mut s = storage();
        project(&mut s, "P", Priority::High);
        assert!(s.set_project_status("p", ProjectStatus::Completed).unwrap());
        assert!(!s.set_project_status("ghost", ProjectStatus::Active).unwrap());

        let listed = s.list_projects().unwrap();
        assert_eq!(listed[0].project.status, ProjectStatus::Completed);
    }

    #[test]
    fn test_append_and_clear_log() {
        let mut s = storage();
        s.append_log(None, None, "note", "manual entry").unwrap();
        s.append_log(None, None, "note", "another").unwrap();
        assert_eq!(s.list_logs(None).unwrap().len(), 2);
        assert_eq!(s.clear_logs().unwrap(), 2);
        assert!(s.list_logs(None).unwrap().is_empty());
    }

    #[test]
    fn test_count_today() {
        let mut s = storage();
        let p = project(&mut s, "P", Priority::High);
        assert_eq!(s.count_today().unwrap(), 0);
        let t = task(&mut s, &p, "t");
        s.set_list_priority(&t.id, Some(ListPriority::Today)).unwrap();
        assert_eq!(s.count_today().unwrap(), 1);
    }
}
