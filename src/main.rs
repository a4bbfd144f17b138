//! Shootplan CLI - Photography Shoot Planner
//!
//! Command-line interface for planning photography shoots.

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use shootplan::cli::commands::{self, Workspace};
use shootplan::cli::{Cli, Commands};
use shootplan::model::{NewEquipment, NewExpense, NewInspiration, NewProject, NewTask, NewTeamMember};
use shootplan::{logging, PlannerConfig, PlannerError};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PlannerConfig::from_env().context("failed to load configuration")?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    logging::init_tracing(&config.log_level, cli.verbose);

    info!("Shootplan v{}", env!("CARGO_PKG_VERSION"));
    debug!(?config, "configuration loaded");

    let Some(cmd) = cli.command else {
        println!("Shootplan v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for available commands");
        return Ok(());
    };

    let mut ws = Workspace::from_config(&config);
    if let Err(e) = handle_command(&mut ws, cmd) {
        report(&e);
        std::process::exit(1);
    }
    Ok(())
}

fn report(e: &PlannerError) {
    eprintln!("Error [{}]: {}", e.error_code(), e);
    if let Some(hint) = e.recovery_suggestion() {
        eprintln!("Hint: {}", hint);
    }
}

fn handle_command(ws: &mut Workspace<shootplan::FileBackend>, cmd: Commands) -> shootplan::Result<()> {
    match cmd {
        Commands::New {
            title,
            project_type,
            status,
            description,
            location,
            date,
            budget,
            template,
        } => {
            let draft = NewProject {
                project_type,
                status,
                description,
                location,
                shoot_date: date,
                budget,
                ..NewProject::titled(title)
            };
            commands::new_project(ws, draft, template.as_deref()).map(|_| ())
        }
        Commands::List { search, status } => {
            commands::list_projects(ws, search.as_deref(), status)
        }
        Commands::Show { target, json } => commands::show_project(ws, &target, json),
        Commands::Delete { id } => commands::delete_project(ws, &id),
        Commands::Select { id, clear } => {
            let id = if clear { None } else { id };
            commands::select_project(ws, id.as_deref())
        }
        Commands::AddTask {
            task,
            due,
            assign,
            priority,
            category,
            target,
        } => {
            let task = NewTask {
                due_date: due,
                assigned_to: assign,
                priority,
                category,
                ..NewTask::new(task)
            };
            commands::add_task(ws, &target, task)
        }
        Commands::ToggleTask { task_id, target } => commands::toggle_task(ws, &target, &task_id),
        Commands::RemoveTask { task_id, target } => commands::remove_task(ws, &target, &task_id),
        Commands::AddExpense {
            description,
            amount,
            category,
            status,
            date,
            target,
        } => {
            let expense = NewExpense {
                description,
                amount,
                category,
                status,
                date,
            };
            commands::add_expense(ws, &target, expense)
        }
        Commands::ExpenseStatus {
            expense_id,
            status,
            target,
        } => commands::set_expense_status(ws, &target, &expense_id, status),
        Commands::RemoveExpense { expense_id, target } => {
            commands::remove_expense(ws, &target, &expense_id)
        }
        Commands::AddMember {
            name,
            role,
            contact,
            rate,
            confirmed,
            target,
        } => {
            let member = NewTeamMember {
                confirmed,
                rate,
                ..NewTeamMember::new(name, role, contact)
            };
            commands::add_member(ws, &target, member)
        }
        Commands::RemoveMember { member_id, target } => {
            commands::remove_member(ws, &target, &member_id)
        }
        Commands::AddEquipment {
            name,
            equipment_type,
            optional,
            brand,
            model,
            notes,
            target,
        } => {
            let equipment = NewEquipment {
                name,
                equipment_type,
                is_required: !optional,
                brand,
                model,
                notes,
                ..NewEquipment::default()
            };
            commands::add_equipment(ws, &target, equipment)
        }
        Commands::RemoveEquipment {
            equipment_id,
            target,
        } => commands::remove_equipment(ws, &target, &equipment_id),
        Commands::AddInspiration {
            url,
            title,
            description,
            tags,
            category,
            target,
        } => {
            let image = NewInspiration {
                url,
                title,
                description,
                category,
                ..NewInspiration::default()
            };
            commands::add_inspiration(ws, &target, image, tags.as_deref())
        }
        Commands::RemoveInspiration { image_id, target } => {
            commands::remove_inspiration(ws, &target, &image_id)
        }
        Commands::Templates => {
            commands::list_templates();
            Ok(())
        }
        Commands::ApplyTemplate {
            template_id,
            target,
        } => commands::use_template(ws, &target, &template_id),
        Commands::Stats { target } => commands::show_stats(ws, &target),
        Commands::Export { output } => commands::export_data(ws, output.as_deref()),
        Commands::Import { file } => commands::import_data(ws, &file),
        Commands::Clear { yes } => commands::clear_data(ws, yes),
        Commands::Info => commands::storage_info(ws),
        Commands::Migrate => commands::migrate_data(ws),
    }
}
