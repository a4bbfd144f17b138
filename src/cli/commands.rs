//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command. Every command works on
//! a [`Workspace`] so the same code runs against the file store or an
//! in-memory one.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::cli::Target;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::model::entities::parse_tags;
use crate::model::mutators;
use crate::model::{
    apply_template, budget_summary, project_stats, ExpenseStatus, NewEquipment, NewExpense,
    NewInspiration, NewProject, NewTask, NewTeamMember, Project, ProjectStatus, TEMPLATES,
};
use crate::state::{FileBackend, KvBackend, ProjectStore, StorageManager};

/// The store and the storage manager over one backend.
pub struct Workspace<B: KvBackend> {
    pub store: ProjectStore<B>,
    pub storage: StorageManager<B>,
}

impl Workspace<FileBackend> {
    /// Open the file store configured for this run.
    pub fn from_config(config: &PlannerConfig) -> Self {
        info!(data_dir = %config.data_dir.display(), "opening data directory");
        Self::open(
            FileBackend::new(&config.data_dir),
            config.sync_external_changes,
        )
    }
}

impl<B: KvBackend> Workspace<B> {
    pub fn open(backend: B, sync: bool) -> Self {
        Self {
            store: ProjectStore::open(backend.clone(), sync),
            storage: StorageManager::new(backend),
        }
    }

    /// Id named by `--project`, or the selected project.
    fn resolve(&self, target: &Target) -> Result<String> {
        match (&target.project, self.store.selected_id()) {
            (Some(id), _) => Ok(id.clone()),
            (None, Some(id)) => Ok(id.to_string()),
            (None, None) => Err(PlannerError::validation(
                "project",
                "no project selected; pass --project or run `shootplan select`",
            )),
        }
    }

    /// A one-shot command must not end with changes held only in memory.
    fn ensure_saved(&self) -> Result<()> {
        if self.store.has_unsaved_changes() {
            return Err(PlannerError::StorageUnavailable {
                reason: self
                    .store
                    .last_storage_error()
                    .unwrap_or("change could not be saved")
                    .to_string(),
            });
        }
        Ok(())
    }

    fn edit<F>(&mut self, target: &Target, change: F) -> Result<Project>
    where
        F: FnOnce(&Project) -> Result<Project>,
    {
        let id = self.resolve(target)?;
        let project = self.store.update(&id, change)?;
        self.ensure_saved()?;
        Ok(project)
    }
}

fn print_project(project: &Project) {
    println!("{} [{}]", project.title, project.id);
    println!("  Type: {} | Status: {}", project.project_type, project.status);
    if let Some(date) = project.shoot_date {
        println!("  Shoot date: {}", date.format("%Y-%m-%d"));
    }
    if let Some(location) = &project.location {
        println!("  Location: {}", location);
    }
    if let Some(budget) = project.budget {
        println!("  Budget: {:.2}", budget);
    }
    if let Some(description) = &project.description {
        println!("  {}", description);
    }

    if !project.checklist.is_empty() {
        println!("\nChecklist:");
        for task in &project.checklist {
            let mark = if task.completed { "x" } else { " " };
            let assignee = task
                .assigned_to
                .as_deref()
                .map(|a| format!(" @{}", a))
                .unwrap_or_default();
            println!("  [{}] {} ({}){} [{}]", mark, task.task, task.priority, assignee, task.id);
        }
    }

    if !project.expenses.is_empty() {
        println!("\nExpenses:");
        for expense in &project.expenses {
            println!(
                "  {:>10.2}  {} ({}, {}) [{}]",
                expense.amount, expense.description, expense.category, expense.status, expense.id
            );
        }
    }

    if !project.team.is_empty() {
        println!("\nTeam:");
        for member in &project.team {
            let confirmed = if member.confirmed { "confirmed" } else { "pending" };
            println!(
                "  {} - {} <{}> {} [{}]",
                member.name, member.role, member.contact, confirmed, member.id
            );
        }
    }

    if !project.equipment.is_empty() {
        println!("\nEquipment:");
        for item in &project.equipment {
            let required = if item.is_required { "" } else { " (optional)" };
            println!("  {} ({}){} [{}]", item.name, item.equipment_type, required, item.id);
        }
    }

    if !project.inspiration_images.is_empty() {
        println!("\nInspiration:");
        for image in &project.inspiration_images {
            println!("  {} - {} [{}]", image.title, image.url, image.id);
        }
    }
}

// ============================================================================
// Projects
// ============================================================================

/// Create a project, optionally seeded from a template.
pub fn new_project<B: KvBackend>(
    ws: &mut Workspace<B>,
    draft: NewProject,
    template: Option<&str>,
) -> Result<Project> {
    let mut project = ws.store.create(draft)?;
    if let Some(template_id) = template {
        project = ws
            .store
            .update(&project.id, |p| apply_template(p, template_id))?;
    }
    ws.ensure_saved()?;

    println!("Project created: {} [{}]", project.title, project.id);
    Ok(project)
}

pub fn list_projects<B: KvBackend>(
    ws: &Workspace<B>,
    search: Option<&str>,
    status: Option<ProjectStatus>,
) -> Result<()> {
    if ws.store.is_read_only() {
        warn!("stored projects could not be read");
        println!("Stored projects could not be read. Run `shootplan migrate`, or `shootplan import` a backup.");
    }

    let projects = ws.store.search(search.unwrap_or(""), status);
    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }

    let selected = ws.store.selected_id();
    for project in projects {
        let marker = if Some(project.id.as_str()) == selected { "* " } else { "  " };
        println!(
            "{}{}  {:<12} {:<11} {}",
            marker,
            project.id,
            project.project_type.to_string(),
            project.status.to_string(),
            project.title
        );
    }
    Ok(())
}

pub fn show_project<B: KvBackend>(ws: &Workspace<B>, target: &Target, json: bool) -> Result<()> {
    let id = ws.resolve(target)?;
    let project = ws
        .store
        .get(&id)
        .ok_or(PlannerError::ProjectNotFound { id })?;

    if json {
        println!("{}", serde_json::to_string_pretty(project)?);
    } else {
        print_project(project);
    }
    Ok(())
}

pub fn delete_project<B: KvBackend>(ws: &mut Workspace<B>, id: &str) -> Result<()> {
    let removed = ws.store.delete(id)?;
    ws.ensure_saved()?;
    println!("Deleted: {}", removed.title);
    Ok(())
}

pub fn select_project<B: KvBackend>(ws: &mut Workspace<B>, id: Option<&str>) -> Result<()> {
    ws.store.select(id)?;
    ws.ensure_saved()?;
    match ws.store.selected() {
        Some(project) => println!("Selected: {}", project.title),
        None => println!("Selection cleared."),
    }
    Ok(())
}

// ============================================================================
// Project contents
// ============================================================================

pub fn add_task<B: KvBackend>(ws: &mut Workspace<B>, target: &Target, task: NewTask) -> Result<()> {
    let project = ws.edit(target, |p| mutators::add_task(p, task))?;
    if let Some(added) = project.checklist.last() {
        println!("Task added: {} [{}]", added.task, added.id);
    }
    Ok(())
}

pub fn toggle_task<B: KvBackend>(ws: &mut Workspace<B>, target: &Target, task_id: &str) -> Result<()> {
    let project = ws.edit(target, |p| Ok(mutators::toggle_task(p, task_id)))?;
    match project.task(task_id) {
        Some(task) if task.completed => println!("Done: {}", task.task),
        Some(task) => println!("Reopened: {}", task.task),
        None => warn!(task_id, "no such task"),
    }
    Ok(())
}

pub fn remove_task<B: KvBackend>(ws: &mut Workspace<B>, target: &Target, task_id: &str) -> Result<()> {
    ws.edit(target, |p| Ok(mutators::remove_task(p, task_id)))?;
    println!("Task removed.");
    Ok(())
}

pub fn add_expense<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    expense: NewExpense,
) -> Result<()> {
    let project = ws.edit(target, |p| mutators::add_expense(p, expense))?;
    if let Some(added) = project.expenses.last() {
        println!("Expense added: {} {:.2} [{}]", added.description, added.amount, added.id);
    }
    Ok(())
}

pub fn set_expense_status<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    expense_id: &str,
    status: ExpenseStatus,
) -> Result<()> {
    ws.edit(target, |p| Ok(mutators::update_expense_status(p, expense_id, status)))?;
    println!("Expense status: {}", status);
    Ok(())
}

pub fn remove_expense<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    expense_id: &str,
) -> Result<()> {
    ws.edit(target, |p| Ok(mutators::remove_expense(p, expense_id)))?;
    println!("Expense removed.");
    Ok(())
}

pub fn add_member<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    member: NewTeamMember,
) -> Result<()> {
    let project = ws.edit(target, |p| mutators::add_team_member(p, member))?;
    if let Some(added) = project.team.last() {
        println!("Team member added: {} [{}]", added.name, added.id);
    }
    Ok(())
}

pub fn remove_member<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    member_id: &str,
) -> Result<()> {
    let id = ws.resolve(target)?;
    ws.store.remove_team_member(&id, member_id)?;
    ws.ensure_saved()?;
    println!("Team member removed.");
    Ok(())
}

pub fn add_equipment<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    equipment: NewEquipment,
) -> Result<()> {
    let project = ws.edit(target, |p| mutators::add_equipment(p, equipment))?;
    if let Some(added) = project.equipment.last() {
        println!("Equipment added: {} [{}]", added.name, added.id);
    }
    Ok(())
}

pub fn remove_equipment<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    equipment_id: &str,
) -> Result<()> {
    ws.edit(target, |p| Ok(mutators::remove_equipment(p, equipment_id)))?;
    println!("Equipment removed.");
    Ok(())
}

pub fn add_inspiration<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    mut image: NewInspiration,
    tags: Option<&str>,
) -> Result<()> {
    if let Some(raw) = tags {
        image.tags = parse_tags(raw);
    }
    let project = ws.edit(target, |p| mutators::add_inspiration(p, image))?;
    if let Some(added) = project.inspiration_images.last() {
        println!("Inspiration added: {} [{}]", added.title, added.id);
    }
    Ok(())
}

pub fn remove_inspiration<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    image_id: &str,
) -> Result<()> {
    ws.edit(target, |p| Ok(mutators::remove_inspiration(p, image_id)))?;
    println!("Inspiration removed.");
    Ok(())
}

pub fn list_templates() {
    for template in TEMPLATES {
        println!(
            "{:<24} {:<11} {}",
            template.id,
            template.project_type.to_string(),
            template.name
        );
        println!("{:<24} {}", "", template.description);
    }
}

pub fn use_template<B: KvBackend>(
    ws: &mut Workspace<B>,
    target: &Target,
    template_id: &str,
) -> Result<()> {
    let project = ws.edit(target, |p| apply_template(p, template_id))?;
    println!(
        "Template applied: {} tasks, {} equipment items, {} references",
        project.checklist.len(),
        project.equipment.len(),
        project.inspiration_images.len()
    );
    Ok(())
}

pub fn show_stats<B: KvBackend>(ws: &Workspace<B>, target: &Target) -> Result<()> {
    let id = ws.resolve(target)?;
    let project = ws
        .store
        .get(&id)
        .ok_or(PlannerError::ProjectNotFound { id })?;

    let stats = project_stats(project, Utc::now());
    let budget = budget_summary(project);

    println!("=== {} ===", project.title);
    println!(
        "Tasks: {}/{} done ({}%), {} overdue",
        stats.completed_tasks, stats.total_tasks, stats.completion_rate, stats.overdue_tasks
    );
    println!("Team: {}/{} confirmed", stats.confirmed_members, stats.team_size);
    println!("{:-<40}", "");
    println!("Budget:   {:>12.2}", budget.planned_budget);
    println!("Expenses: {:>12.2}", budget.total_expenses);
    println!("Team:     {:>12.2}", budget.team_costs);
    println!("Total:    {:>12.2} ({:.1}%)", budget.total_spend, budget.usage_percent);
    for (category, amount) in budget.by_category.iter().filter(|(_, a)| **a > 0.0) {
        println!("  {:<10} {:>10.2}", category, amount);
    }
    if budget.is_over_budget() {
        println!("WARNING: over budget");
    }
    Ok(())
}

// ============================================================================
// Storage management
// ============================================================================

pub fn export_data<B: KvBackend>(ws: &Workspace<B>, output: Option<&Path>) -> Result<()> {
    let json = ws.storage.export_data()?;
    match output {
        Some(path) => {
            fs::write(path, &json).map_err(|e| PlannerError::FileWriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn import_data<B: KvBackend>(ws: &Workspace<B>, file: &Path) -> Result<()> {
    let json = fs::read_to_string(file).map_err(|e| PlannerError::FileReadError {
        path: file.to_path_buf(),
        source: e,
    })?;

    let outcome = ws.storage.import_data(&json);
    if !outcome.success {
        return Err(PlannerError::InvalidDocument {
            reason: outcome.message,
        });
    }
    println!("{}", outcome.message);
    Ok(())
}

pub fn clear_data<B: KvBackend>(ws: &mut Workspace<B>, confirmed: bool) -> Result<()> {
    if !confirmed {
        if ws.store.is_read_only() {
            println!("This deletes the unreadable stored projects and the selection. Re-run with --yes to confirm.");
        } else {
            println!(
                "This deletes {} projects and the selection. Re-run with --yes to confirm.",
                ws.store.list().len()
            );
        }
        return Ok(());
    }
    ws.store.clear()?;
    println!("All data cleared.");
    Ok(())
}

pub fn storage_info<B: KvBackend>(ws: &Workspace<B>) -> Result<()> {
    let info = ws.storage.get_storage_info()?;
    println!("Items:    {}", info.item_count);
    println!("Total:    {}", info.formatted_total_size);
    println!("Projects: {}", info.formatted_projects_size);
    println!("Selected: {} Bytes", info.selected_project_size);
    Ok(())
}

pub fn migrate_data<B: KvBackend>(ws: &Workspace<B>) -> Result<()> {
    let report = ws.storage.migrate_data();
    if !report.success {
        return Err(PlannerError::MigrationError {
            reason: report.message,
        });
    }
    println!("{}", report.message);
    if report.skipped > 0 {
        println!("{} unrecognized records left unchanged.", report.skipped);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryBackend;
    use tempfile::tempdir;

    fn workspace() -> Workspace<MemoryBackend> {
        Workspace::open(MemoryBackend::new(), true)
    }

    #[test]
    fn test_commands_default_to_selected_project() {
        let mut ws = workspace();
        let project = new_project(&mut ws, NewProject::titled("Studio"), None).unwrap();

        add_task(&mut ws, &Target::default(), NewTask::new("Book studio")).unwrap();

        assert_eq!(ws.store.get(&project.id).unwrap().checklist.len(), 1);
    }

    #[test]
    fn test_commands_need_a_project() {
        let mut ws = workspace();
        assert!(matches!(
            add_task(&mut ws, &Target::default(), NewTask::new("Orphan")),
            Err(PlannerError::Validation { field: "project", .. })
        ));
    }

    #[test]
    fn test_new_project_with_template() {
        let mut ws = workspace();
        let project =
            new_project(&mut ws, NewProject::titled("Headshots"), Some("portrait-classic")).unwrap();

        assert!(!project.checklist.is_empty());
        assert_eq!(project.templates, vec!["portrait-classic"]);
    }

    #[test]
    fn test_export_then_import_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("backup.json");

        let mut source = workspace();
        new_project(&mut source, NewProject::titled("Backup me"), None).unwrap();
        export_data(&source, Some(&file)).unwrap();

        let target = workspace();
        import_data(&target, &file).unwrap();
        assert_eq!(target.storage.projects().len(), 1);
        assert_eq!(target.storage.projects()[0].title, "Backup me");
    }

    #[test]
    fn test_import_failure_is_an_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.json");
        fs::write(&file, "{}").unwrap();

        let ws = workspace();
        assert!(matches!(
            import_data(&ws, &file),
            Err(PlannerError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut ws = workspace();
        new_project(&mut ws, NewProject::titled("Keep"), None).unwrap();

        clear_data(&mut ws, false).unwrap();
        assert_eq!(ws.storage.projects().len(), 1);

        clear_data(&mut ws, true).unwrap();
        assert!(ws.storage.projects().is_empty());
        assert!(ws.store.list().is_empty());
    }

    #[test]
    fn test_unreadable_store_blocks_edits_until_cleared() {
        let backend = MemoryBackend::new();
        backend
            .set_item(
                crate::state::PROJECTS_KEY,
                r#"[{"id":"x","title":"X","type":"fashion","createdAt":"2024-03-01T00:00:00Z"}]"#,
            )
            .unwrap();
        let mut ws = Workspace::open(backend, true);

        assert!(matches!(
            new_project(&mut ws, NewProject::titled("Blocked"), None),
            Err(PlannerError::StorageUnavailable { .. })
        ));
        assert!(list_projects(&ws, None, None).is_ok());

        clear_data(&mut ws, true).unwrap();
        assert!(new_project(&mut ws, NewProject::titled("Fresh"), None).is_ok());
    }
}
