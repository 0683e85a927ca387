use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::model::{DEFAULT_TASK_LIST, TaskStatus, parse_due_input};

/// Google Tasks from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "gt", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Tasks API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for the local task mirror
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    /// Skip the local task mirror for this run
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// List open tasks (default command)
    List {
        /// Task list name (default: all lists)
        #[arg(short = 'l', long)]
        tasklist: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Task list name
        #[arg(short = 'l', long, default_value = DEFAULT_TASK_LIST)]
        tasklist: String,

        /// Task notes
        #[arg(long)]
        notes: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_due_input)]
        due: Option<NaiveDate>,
    },

    /// Mark a task as completed
    Done {
        /// Full or short task ID (omit to pick interactively)
        task_id: Option<String>,

        /// Task list name (default: search all lists)
        #[arg(short = 'l', long)]
        tasklist: Option<String>,
    },

    /// Change a task's fields or move it to another list
    Edit {
        /// Full or short task ID (omit to pick interactively)
        task_id: Option<String>,

        /// Task list name (default: search all lists)
        #[arg(short = 'l', long)]
        tasklist: Option<String>,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_due_input)]
        due: Option<NaiveDate>,

        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,

        /// New status (needsAction, completed)
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Move the task to this list
        #[arg(long)]
        move_to: Option<String>,
    },

    /// Delete a task
    Delete {
        /// Full or short task ID (omit to pick interactively)
        task_id: Option<String>,

        /// Task list name (default: search all lists)
        #[arg(short = 'l', long)]
        tasklist: Option<String>,
    },

    /// Remove the stored token and the local task mirror
    Logout,
}

impl Default for CliCommand {
    fn default() -> Self {
        CliCommand::List {
            tasklist: None,
            json: false,
        }
    }
}
