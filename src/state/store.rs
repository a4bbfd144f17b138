//! The planner's top-level state: the project list and the selection.
//!
//! Every change goes through [`ProjectStore`], which applies it to the
//! in-memory list, refreshes `updatedAt` and writes the list through before
//! returning. Storage faults are absorbed by the underlying slots and can be
//! inspected with [`ProjectStore::last_storage_error`].
//!
//! Stored projects are migrated in memory as they are read. When the stored
//! list still cannot be read, the store opens empty and refuses every change
//! to the list until the data is migrated, imported or cleared.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{PlannerError, Result};
use crate::model::integrity::unassign_member;
use crate::model::mutators;
use crate::model::{NewProject, Project, ProjectStatus};
use crate::state::backend::KvBackend;
use crate::state::slot::Slot;
use crate::state::storage::{decode_projects, PROJECTS_KEY, SELECTED_PROJECT_KEY};

/// Projects plus the currently selected project id.
pub struct ProjectStore<B: KvBackend> {
    projects: Slot<Vec<Project>, B>,
    selected: Slot<Option<String>, B>,
}

impl<B: KvBackend> ProjectStore<B> {
    /// Load state from `backend`.
    ///
    /// With `sync` off, [`ProjectStore::sync`] never adopts external changes.
    pub fn open(backend: B, sync: bool) -> Self {
        let mut projects =
            Slot::open_with(backend.clone(), PROJECTS_KEY, Vec::new(), decode_projects);
        let mut selected = Slot::open(backend, SELECTED_PROJECT_KEY, None);
        projects.set_sync(sync);
        selected.set_sync(sync);

        if projects.is_read_only() {
            warn!(
                error = projects.last_error().unwrap_or("unknown"),
                "stored projects unreadable, store is read-only"
            );
        }
        debug!(projects = projects.get().len(), "project store opened");
        Self { projects, selected }
    }

    /// Projects, newest first.
    pub fn list(&self) -> &[Project] {
        self.projects.get()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.list().iter().find(|p| p.id == id)
    }

    fn require(&self, id: &str) -> Result<&Project> {
        self.get(id).ok_or_else(|| PlannerError::ProjectNotFound { id: id.to_string() })
    }

    /// Whether the stored list could not be read and changes are refused.
    pub fn is_read_only(&self) -> bool {
        self.projects.is_read_only()
    }

    fn ensure_writable(&self) -> Result<()> {
        if !self.projects.is_read_only() {
            return Ok(());
        }
        Err(PlannerError::StorageUnavailable {
            reason: format!(
                "stored projects could not be read ({}); migrate, import or clear the data first",
                self.projects.last_error().unwrap_or("unknown error")
            ),
        })
    }

    /// Create a project at the front of the list and select it.
    pub fn create(&mut self, draft: NewProject) -> Result<Project> {
        self.ensure_writable()?;
        let project = Project::create(draft, Utc::now())?;

        let created = project.clone();
        self.projects.update(|list| {
            let mut next = Vec::with_capacity(list.len() + 1);
            next.push(created);
            next.extend(list.iter().cloned());
            next
        });
        self.selected.set(Some(project.id.clone()));

        info!(id = %project.id, title = %project.title, "project created");
        Ok(project)
    }

    /// Apply `change` to one project and persist the result.
    ///
    /// The id cannot be changed and `updatedAt` is refreshed. A change that
    /// fails leaves the store untouched.
    pub fn update<F>(&mut self, id: &str, change: F) -> Result<Project>
    where
        F: FnOnce(&Project) -> Result<Project>,
    {
        self.ensure_writable()?;
        let current = self.require(id)?;
        let mut next = change(current)?;
        next.id = current.id.clone();
        next.created_at = current.created_at;
        next.touch(Utc::now());

        self.store_project(next.clone());
        debug!(id, "project updated");
        Ok(next)
    }

    /// Overwrite a stored project with `project`, matched by id.
    pub fn replace(&mut self, project: Project) -> Result<()> {
        self.ensure_writable()?;
        self.require(&project.id)?;
        project.check_invariants()?;
        self.store_project(project);
        Ok(())
    }

    fn store_project(&mut self, project: Project) {
        self.projects.update(|list| {
            list.iter()
                .map(|p| if p.id == project.id { project.clone() } else { p.clone() })
                .collect()
        });
    }

    /// Remove a project, clearing the selection if it pointed at it.
    pub fn delete(&mut self, id: &str) -> Result<Project> {
        self.ensure_writable()?;
        let removed = self.require(id)?.clone();
        self.projects
            .update(|list| list.iter().filter(|p| p.id != id).cloned().collect());

        if self.selected.get().as_deref() == Some(id) {
            self.selected.set(None);
        }

        info!(id, "project deleted");
        Ok(removed)
    }

    /// Select a project, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            self.require(id)?;
        }
        self.selected.set(id.map(String::from));
        Ok(())
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.get().as_deref()
    }

    /// The selected project, if the selection names one that exists.
    pub fn selected(&self) -> Option<&Project> {
        self.selected_id().and_then(|id| self.get(id))
    }

    /// Case-insensitive match on title, description and location, optionally
    /// restricted to one status.
    pub fn search(&self, text: &str, status: Option<ProjectStatus>) -> Vec<&Project> {
        let needle = text.trim().to_lowercase();
        let contains = |field: Option<&str>| {
            field.is_some_and(|f| f.to_lowercase().contains(&needle))
        };

        self.list()
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .filter(|p| {
                needle.is_empty()
                    || contains(Some(p.title.as_str()))
                    || contains(p.description.as_deref())
                    || contains(p.location.as_deref())
            })
            .collect()
    }

    /// Remove a team member and clear checklist items assigned to them.
    pub fn remove_team_member(&mut self, project_id: &str, member_id: &str) -> Result<Project> {
        self.update(project_id, |project| {
            let cleared = match project.team.iter().find(|m| m.id == member_id) {
                Some(member) => unassign_member(project, &member.name),
                None => project.clone(),
            };
            Ok(mutators::remove_team_member(&cleared, member_id))
        })
    }

    /// Delete every project and the selection, readable or not.
    pub fn clear(&mut self) -> Result<()> {
        self.projects.remove();
        self.selected.remove();
        if self.has_unsaved_changes() {
            return Err(PlannerError::StorageUnavailable {
                reason: self
                    .last_storage_error()
                    .unwrap_or("stored data could not be removed")
                    .to_string(),
            });
        }
        info!("project store cleared");
        Ok(())
    }

    /// Adopt changes written by other handles. Returns true if anything changed.
    pub fn sync(&mut self) -> bool {
        let projects = self.projects.poll_external();
        let selected = self.selected.poll_external();
        projects || selected
    }

    /// Run `watcher` whenever [`ProjectStore::sync`] adopts a new project list.
    pub fn watch_projects<F>(&mut self, watcher: F)
    where
        F: FnMut(&Vec<Project>) + 'static,
    {
        self.projects.watch(watcher);
    }

    /// Whether some change is held only in memory.
    pub fn has_unsaved_changes(&self) -> bool {
        self.projects.is_dirty() || self.selected.is_dirty()
    }

    pub fn last_storage_error(&self) -> Option<&str> {
        self.projects
            .last_error()
            .or_else(|| self.selected.last_error())
    }
}
