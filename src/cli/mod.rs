//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// Personal project/task tracker with focus lists and an activity log
#[derive(Parser, Debug)]
#[command(name = "tt", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.tasktrack/data/tasktrack.db)
    #[arg(long, global = true, env = "TT_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON (for agent integration)
    #[arg(long, alias = "robot", global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Output only the ID (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the tracker database
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Show a project's tasks grouped by status column
    Board {
        /// Project slug
        slug: String,
    },

    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Quick-add a todo task to a project
    Quick {
        /// Project slug
        slug: String,

        /// Task title
        title: String,
    },

    /// Daily focus dashboard: TODAY list, THIS WEEK list, suggested next task
    Today,

    /// Show the THIS WEEK focus list
    Week,

    /// Show tasks completed in the last 7 days
    Recent,

    /// Pick the next task to work on
    Next {
        /// Restrict to one project by slug
        slug: Option<String>,
    },

    /// Subtask management
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },

    /// Activity log
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },

    /// Populate a demo workspace (skipped if projects exist)
    Seed,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Project Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a new project
    Create {
        /// Display name (the slug is derived from this)
        name: String,

        /// Project description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Priority (high, medium, low)
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Local working-copy path
        #[arg(long)]
        local_path: Option<String>,

        /// Repository path
        #[arg(long)]
        github_path: Option<String>,
    },

    /// List all projects with completion stats
    List,

    /// Show one project with its tasks and subtasks
    Show {
        /// Project slug
        slug: String,
    },

    /// Set a project's status
    Status {
        /// Project slug (or full ID)
        slug: String,

        /// New status (active, blocked, completed, planning)
        status: String,
    },
}

// ============================================================================
// Task Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task to a project
    Add {
        /// Project slug
        slug: String,

        /// Task title
        title: String,

        /// Task description
        #[arg(short, long)]
        description: Option<String>,

        /// Prompt to hand an AI agent working this task
        #[arg(long)]
        ai_prompt: Option<String>,

        /// Put the task straight on a focus list (today, week)
        #[arg(short, long)]
        list: Option<String>,
    },

    /// Set a task's status
    Status {
        /// Task ID
        id: String,

        /// New status (todo, in_progress, done, blocked)
        status: String,

        /// Why the task is blocked (only meaningful with blocked)
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Move a task between focus lists
    Focus {
        /// Task ID
        id: String,

        /// Target list (today, week, backlog)
        list: String,
    },

    /// Clear completion timestamps on tasks done more than a week ago
    Archive,
}

// ============================================================================
// Subtask Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Add a subtask to a task
    Add {
        /// Parent task ID
        task_id: String,

        /// Subtask title
        title: String,
    },

    /// Flip a subtask's done checkbox
    Toggle {
        /// Subtask ID
        id: String,
    },
}

// ============================================================================
// Log Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Show recent activity, newest first
    List {
        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Append a free-form entry
    Add {
        /// Short action tag (e.g. "note")
        action: String,

        /// Human-readable description
        description: String,

        /// Related project ID
        #[arg(long)]
        project: Option<String>,

        /// Related task ID
        #[arg(long)]
        task: Option<String>,
    },

    /// Delete every log entry
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}
