//! CLI Module
//!
//! Command-line interface for the shootplan project planner.

pub mod commands;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use crate::model::{
    EquipmentType, ExpenseCategory, ExpenseStatus, InspirationCategory, Priority, ProjectStatus,
    ProjectType, TaskCategory,
};
use crate::state::revive::parse_date_lenient;

/// Shootplan - plan photography shoots from the terminal
#[derive(Parser, Debug)]
#[command(name = "shootplan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Data directory (overrides SHOOTPLAN_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Which project a command applies to. Defaults to the selected project.
#[derive(Args, Debug, Clone, Default)]
pub struct Target {
    /// Project id
    #[arg(short, long)]
    pub project: Option<String>,
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD`.
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    parse_date_lenient(value).ok_or_else(|| format!("'{}' is not a date", value))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project and select it
    #[command(name = "new")]
    New {
        /// Project title
        title: String,

        #[arg(short = 't', long = "type", default_value = "portrait")]
        project_type: ProjectType,

        #[arg(short, long, default_value = "planning")]
        status: ProjectStatus,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Shoot date
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,

        #[arg(short, long)]
        budget: Option<f64>,

        /// Template to apply after creation
        #[arg(long)]
        template: Option<String>,
    },

    /// List projects
    #[command(name = "list")]
    List {
        /// Filter by title, description or location
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        status: Option<ProjectStatus>,
    },

    /// Show one project (the selected one by default)
    #[command(name = "show")]
    Show {
        #[command(flatten)]
        target: Target,

        /// Print the stored JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Delete a project
    #[command(name = "delete")]
    Delete {
        /// Project id
        id: String,
    },

    /// Select a project, or clear the selection
    #[command(name = "select")]
    Select {
        /// Project id
        id: Option<String>,

        #[arg(long, conflicts_with = "id")]
        clear: bool,
    },

    /// Add a checklist task
    #[command(name = "add-task")]
    AddTask {
        task: String,

        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,

        /// Team member name
        #[arg(long)]
        assign: Option<String>,

        #[arg(long, default_value = "medium")]
        priority: Priority,

        #[arg(long, default_value = "other")]
        category: TaskCategory,

        #[command(flatten)]
        target: Target,
    },

    /// Toggle a task between done and not done
    #[command(name = "toggle-task")]
    ToggleTask {
        task_id: String,

        #[command(flatten)]
        target: Target,
    },

    /// Remove a checklist task
    #[command(name = "remove-task")]
    RemoveTask {
        task_id: String,

        #[command(flatten)]
        target: Target,
    },

    /// Record an expense
    #[command(name = "add-expense")]
    AddExpense {
        description: String,

        amount: f64,

        #[arg(long, default_value = "other")]
        category: ExpenseCategory,

        #[arg(long, default_value = "planned")]
        status: ExpenseStatus,

        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,

        #[command(flatten)]
        target: Target,
    },

    /// Change an expense's status
    #[command(name = "expense-status")]
    ExpenseStatus {
        expense_id: String,

        status: ExpenseStatus,

        #[command(flatten)]
        target: Target,
    },

    /// Remove an expense
    #[command(name = "remove-expense")]
    RemoveExpense {
        expense_id: String,

        #[command(flatten)]
        target: Target,
    },

    /// Add a team member
    #[command(name = "add-member")]
    AddMember {
        name: String,

        role: String,

        contact: String,

        #[arg(long)]
        rate: Option<f64>,

        #[arg(long)]
        confirmed: bool,

        #[command(flatten)]
        target: Target,
    },

    /// Remove a team member and unassign their tasks
    #[command(name = "remove-member")]
    RemoveMember {
        member_id: String,

        #[command(flatten)]
        target: Target,
    },

    /// Add equipment
    #[command(name = "add-equipment")]
    AddEquipment {
        name: String,

        #[arg(short = 't', long = "type", default_value = "camera")]
        equipment_type: EquipmentType,

        /// Mark as nice-to-have instead of required
        #[arg(long)]
        optional: bool,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        #[command(flatten)]
        target: Target,
    },

    /// Remove equipment
    #[command(name = "remove-equipment")]
    RemoveEquipment {
        equipment_id: String,

        #[command(flatten)]
        target: Target,
    },

    /// Add a reference image to the mood board
    #[command(name = "add-inspiration")]
    AddInspiration {
        url: String,

        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(long, default_value = "other")]
        category: InspirationCategory,

        #[command(flatten)]
        target: Target,
    },

    /// Remove a reference image
    #[command(name = "remove-inspiration")]
    RemoveInspiration {
        image_id: String,

        #[command(flatten)]
        target: Target,
    },

    /// List built-in templates
    #[command(name = "templates")]
    Templates,

    /// Replace equipment, checklist and mood board with a template
    #[command(name = "apply-template")]
    ApplyTemplate {
        template_id: String,

        #[command(flatten)]
        target: Target,
    },

    /// Show progress and budget figures
    #[command(name = "stats")]
    Stats {
        #[command(flatten)]
        target: Target,
    },

    /// Export all data as JSON
    #[command(name = "export")]
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import data from an export file
    #[command(name = "import")]
    Import {
        file: PathBuf,
    },

    /// Delete all stored data
    #[command(name = "clear")]
    Clear {
        /// Skip the confirmation notice
        #[arg(long)]
        yes: bool,
    },

    /// Show storage usage
    #[command(name = "info")]
    Info,

    /// Upgrade stored records to the current format
    #[command(name = "migrate")]
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_task() {
        let cli = Cli::parse_from([
            "shootplan",
            "--data-dir",
            "/tmp/plans",
            "add-task",
            "Scout location",
            "--due",
            "2024-04-10",
            "--priority",
            "high",
            "-p",
            "abc",
        ]);

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/plans")));
        match cli.command {
            Some(Commands::AddTask {
                task,
                due,
                priority,
                target,
                ..
            }) => {
                assert_eq!(task, "Scout location");
                assert!(due.is_some());
                assert_eq!(priority, Priority::High);
                assert_eq!(target.project.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_enum() {
        assert!(Cli::try_parse_from(["shootplan", "expense-status", "e1", "refunded"]).is_err());
    }
}
