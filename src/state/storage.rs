//! Whole-dataset storage management.
//!
//! Export, import, reset, size reporting and migration across every key the
//! planner owns. Unlike [`Slot`](crate::state::Slot), the manager reads and
//! writes the keys directly so several of them can be handled as one unit.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{PlannerError, Result};
use crate::model::Project;
use crate::state::backend::KvBackend;
use crate::state::migration::{
    check_document_version, migrate_record, RecordOutcome, CURRENT_SCHEMA_VERSION,
};
use crate::state::revive::revive;
use crate::state::slot;

/// Key holding the array of projects.
pub const PROJECTS_KEY: &str = "photodesign_projects";

/// Key holding the selected project id (or null).
pub const SELECTED_PROJECT_KEY: &str = "photodesign_selected_project";

/// Every key owned by the planner.
pub const KNOWN_KEYS: [&str; 2] = [PROJECTS_KEY, SELECTED_PROJECT_KEY];

/// The export file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub projects: Vec<Project>,
    pub selected_project_id: Option<String>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

/// Result of an import. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    /// Number of projects written.
    pub imported: usize,
}

impl ImportOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            imported: 0,
        }
    }
}

/// Storage usage, measured like browser storage quotas: characters of
/// every value plus its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub total_size: u64,
    pub item_count: usize,
    pub projects_size: u64,
    pub selected_project_size: u64,
    pub formatted_total_size: String,
    pub formatted_projects_size: String,
}

/// Result of [`StorageManager::migrate_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub success: bool,
    /// Whether any record needed changes.
    pub needed: bool,
    pub migrated: usize,
    /// Records left alone because their shape was not recognized.
    pub skipped: usize,
    pub message: String,
}

/// Format a byte count as Bytes, KB or MB with at most two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["Bytes", "KB", "MB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", scaled);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Revive, migrate and deserialize one stored or imported project record.
fn load_record(index: usize, record: &Value) -> Result<Project> {
    let mut record = record.clone();
    revive(&mut record);
    if migrate_record(&mut record) == RecordOutcome::Skipped {
        return Err(PlannerError::InvalidDocument {
            reason: format!("project #{} is not a project record", index + 1),
        });
    }

    let project: Project =
        serde_json::from_value(record).map_err(|e| PlannerError::InvalidDocument {
            reason: format!("project #{}: {}", index + 1, e),
        })?;
    project.check_invariants()?;
    Ok(project)
}

/// Decode the stored project list, migrating legacy records in memory.
///
/// Fails when any record cannot be read; the stored text is never touched.
pub fn decode_projects(text: &str) -> Result<Vec<Project>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(records) = value else {
        return Err(PlannerError::InvalidDocument {
            reason: "stored projects are not an array".to_string(),
        });
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| load_record(index, record))
        .collect()
}

/// Manages the planner's persisted dataset as a whole.
#[derive(Debug, Clone)]
pub struct StorageManager<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> StorageManager<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Stored projects, or none when the key is absent or unreadable.
    pub fn projects(&self) -> Vec<Project> {
        slot::read_with(&self.backend, PROJECTS_KEY, Vec::new(), decode_projects)
    }

    pub fn selected_project_id(&self) -> Option<String> {
        slot::read(&self.backend, SELECTED_PROJECT_KEY, None)
    }

    /// Serialize all projects and the selection as a pretty JSON document.
    pub fn export_data(&self) -> Result<String> {
        let document = ExportDocument {
            projects: self.projects(),
            selected_project_id: self.selected_project_id(),
            exported_at: Utc::now(),
            version: CURRENT_SCHEMA_VERSION.to_string(),
        };
        info!(projects = document.projects.len(), "exporting data");
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Replace stored projects with those in an export document.
    ///
    /// Nothing is written unless every project in the document is valid.
    pub fn import_data(&self, json: &str) -> ImportOutcome {
        let (projects, selected) = match Self::parse_import(json) {
            Ok(parsed) => parsed,
            Err(PlannerError::InvalidDocument { reason }) => {
                warn!(%reason, "import rejected");
                return ImportOutcome::failure(format!("Invalid data format: {}", reason));
            }
            Err(e) => {
                warn!(error = %e, "import rejected");
                return ImportOutcome::failure(format!("Import failed: {}", e));
            }
        };

        if let Err(e) = self.write_projects(&projects) {
            return ImportOutcome::failure(format!("Import failed: {}", e));
        }
        if let Some(id) = selected {
            if let Err(e) = self.write_json(SELECTED_PROJECT_KEY, &id) {
                return ImportOutcome::failure(format!(
                    "Projects imported but the selection could not be saved: {}",
                    e
                ));
            }
        }

        info!(count = projects.len(), "import complete");
        ImportOutcome {
            success: true,
            message: format!("Imported {} projects", projects.len()),
            imported: projects.len(),
        }
    }

    fn parse_import(json: &str) -> Result<(Vec<Project>, Option<String>)> {
        let document: Value = serde_json::from_str(json)?;

        check_document_version(document.get("version").and_then(Value::as_str));

        let Some(records) = document.get("projects").and_then(Value::as_array) else {
            return Err(PlannerError::InvalidDocument {
                reason: "missing projects array".to_string(),
            });
        };

        let mut projects = Vec::with_capacity(records.len());
        let mut ids = HashSet::new();
        for (index, record) in records.iter().enumerate() {
            let project = load_record(index, record)?;
            project.validate()?;
            if !ids.insert(project.id.clone()) {
                return Err(PlannerError::DuplicateProjectId { id: project.id });
            }
            projects.push(project);
        }

        let selected = document
            .get("selectedProjectId")
            .and_then(Value::as_str)
            .map(String::from);

        Ok((projects, selected))
    }

    /// Delete every planner key. Clearing an empty store is fine.
    pub fn clear_all_data(&self) -> Result<()> {
        for key in KNOWN_KEYS {
            self.backend.remove_item(key)?;
        }
        info!("cleared all data");
        Ok(())
    }

    /// Measure what is stored.
    pub fn get_storage_info(&self) -> Result<StorageInfo> {
        let mut total_size: u64 = 0;
        let mut item_count = 0;
        for key in self.backend.keys()? {
            if let Some(value) = self.backend.get_item(&key)? {
                total_size += (value.chars().count() + key.chars().count()) as u64;
                item_count += 1;
            }
        }

        let projects_size = self.stored_len(PROJECTS_KEY)?;
        let selected_project_size = self.stored_len(SELECTED_PROJECT_KEY)?;

        Ok(StorageInfo {
            total_size,
            item_count,
            projects_size,
            selected_project_size,
            formatted_total_size: format_bytes(total_size),
            formatted_projects_size: format_bytes(projects_size),
        })
    }

    fn stored_len(&self, key: &str) -> Result<u64> {
        Ok(self
            .backend
            .get_item(key)?
            .map(|v| v.chars().count() as u64)
            .unwrap_or(0))
    }

    /// Bring stored records up to the current shape.
    pub fn migrate_data(&self) -> MigrationReport {
        let report = |success: bool, needed: bool, migrated, skipped, message: String| {
            MigrationReport {
                success,
                needed,
                migrated,
                skipped,
                message,
            }
        };

        let text = match self.backend.get_item(PROJECTS_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => {
                return report(true, false, 0, 0, "No stored projects; nothing to migrate".into())
            }
            Err(e) => return report(false, false, 0, 0, format!("Migration failed: {}", e)),
        };

        let mut records = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                return report(
                    false,
                    false,
                    0,
                    0,
                    "Migration failed: stored projects are not an array; left unchanged".into(),
                )
            }
            Err(e) => return report(false, false, 0, 0, format!("Migration failed: {}", e)),
        };

        let mut migrated = 0;
        let mut skipped = 0;
        for record in records.iter_mut() {
            match migrate_record(record) {
                RecordOutcome::Migrated => migrated += 1,
                RecordOutcome::Skipped => skipped += 1,
                RecordOutcome::Unchanged => {}
            }
        }

        if migrated == 0 {
            return report(
                true,
                false,
                0,
                skipped,
                "Data is already up to date; no migration needed".into(),
            );
        }

        if let Err(e) = self.write_json(PROJECTS_KEY, &records) {
            return report(false, true, 0, skipped, format!("Migration failed: {}", e));
        }

        info!(migrated, skipped, "migrated stored projects");
        report(
            true,
            true,
            migrated,
            skipped,
            format!("Migration complete: {} projects migrated", migrated),
        )
    }

    fn write_projects(&self, projects: &[Project]) -> Result<()> {
        self.write_json(PROJECTS_KEY, &projects)
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.backend.set_item(key, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewProject, NewTask};
    use crate::model::mutators::add_task;
    use crate::state::backend::MemoryBackend;
    use test_case::test_case;

    fn manager_with(projects: &[Project]) -> StorageManager<MemoryBackend> {
        let manager = StorageManager::new(MemoryBackend::new());
        manager.write_projects(projects).unwrap();
        manager
    }

    fn sample() -> Project {
        let p = Project::create(NewProject::titled("Spring"), Utc::now()).unwrap();
        add_task(&p, NewTask::new("Scout")).unwrap()
    }

    #[test_case(0, "0 Bytes")]
    #[test_case(500, "500 Bytes")]
    #[test_case(1024, "1 KB")]
    #[test_case(1536, "1.5 KB")]
    #[test_case(1_300_000, "1.24 MB")]
    #[test_case(5 * 1024 * 1024 * 1024, "5120 MB"; "capped at megabytes")]
    fn test_format_bytes(bytes: u64, expected: &str) {
        assert_eq!(format_bytes(bytes), expected);
    }

    #[test]
    fn test_export_document_shape() {
        let manager = manager_with(&[sample()]);
        let text = manager.export_data().unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(doc["version"], "1.0.0");
        assert!(doc["selectedProjectId"].is_null());
        assert!(doc["exportedAt"].is_string());
        assert_eq!(doc["projects"].as_array().unwrap().len(), 1);
        assert!(text.contains('\n'), "export is pretty-printed");
    }

    #[test]
    fn test_import_rejects_without_writing() {
        let original = sample();
        let manager = manager_with(&[original.clone()]);

        for bad in ["{}", "not json", r#"{"projects": 3}"#, r#"{"projects":[{"id":"x"}]}"#] {
            let outcome = manager.import_data(bad);
            assert!(!outcome.success, "{} should be rejected", bad);
            assert_eq!(manager.projects(), vec![original.clone()]);
        }
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let p = sample();
        let doc = serde_json::json!({ "projects": [p, p] }).to_string();

        let manager = StorageManager::new(MemoryBackend::new());
        let outcome = manager.import_data(&doc);
        assert!(!outcome.success);
        assert!(outcome.message.contains("Duplicate"));
        assert!(manager.projects().is_empty());
    }

    #[test]
    fn test_import_rejects_negative_amounts() {
        let original = sample();
        let manager = manager_with(&[original.clone()]);

        let mut negative_budget = serde_json::to_value(sample()).unwrap();
        negative_budget["budget"] = serde_json::json!(-10);
        let mut negative_expense = serde_json::to_value(sample()).unwrap();
        negative_expense["expenses"] = serde_json::json!([
            { "id": "e1", "description": "Refund", "amount": -500 }
        ]);
        let mut reversed_window = serde_json::to_value(sample()).unwrap();
        reversed_window["shootingSettings"] =
            serde_json::json!({ "duration": 2, "startTime": "18:00", "endTime": "07:00" });

        for record in [negative_budget, negative_expense, reversed_window] {
            let doc = serde_json::json!({ "projects": [record] }).to_string();
            let outcome = manager.import_data(&doc);
            assert!(!outcome.success, "{}", doc);
            assert!(outcome.message.starts_with("Import failed"));
            assert_eq!(manager.projects(), vec![original.clone()]);
        }
    }

    #[test]
    fn test_decode_projects_migrates_legacy_records() {
        let text = r#"[{ "id": "old", "title": "Old", "createdAt": "2024-03-01T00:00:00" }]"#;
        let projects = decode_projects(text).unwrap();
        assert_eq!(projects[0].id, "old");
        assert_eq!(projects[0].updated_at, projects[0].created_at);

        assert!(decode_projects(r#"[{ "id": "x", "title": "X", "createdAt": "2024-03-01T00:00:00Z", "type": "fashion" }]"#).is_err());
        assert!(decode_projects(r#"["garbage"]"#).is_err());
        assert!(decode_projects(r#"{"a":1}"#).is_err());
    }

    #[test]
    fn test_import_keeps_selection_when_absent() {
        let manager = StorageManager::new(MemoryBackend::new());
        manager.write_json(SELECTED_PROJECT_KEY, "keep-me").unwrap();

        let outcome = manager.import_data(r#"{"projects":[]}"#);
        assert!(outcome.success);
        assert_eq!(manager.selected_project_id().as_deref(), Some("keep-me"));
    }

    #[test]
    fn test_storage_info_counts_keys_and_values() {
        let manager = StorageManager::new(MemoryBackend::new());
        manager.backend().set_item(PROJECTS_KEY, "[]").unwrap();
        manager.backend().set_item("other", "abc").unwrap();

        let info = manager.get_storage_info().unwrap();
        assert_eq!(info.item_count, 2);
        assert_eq!(info.projects_size, 2);
        assert_eq!(info.total_size, (PROJECTS_KEY.len() + 2 + 5 + 3) as u64);
        assert_eq!(info.selected_project_size, 0);
        assert_eq!(info.formatted_projects_size, "2 Bytes");
    }

    #[test]
    fn test_migrate_without_data() {
        let manager = StorageManager::new(MemoryBackend::new());
        let report = manager.migrate_data();
        assert!(report.success);
        assert!(!report.needed);
    }

    #[test]
    fn test_migrate_rewrites_legacy_records() {
        let manager = StorageManager::new(MemoryBackend::new());
        let legacy = serde_json::json!([
            { "id": "1", "title": "Old", "createdAt": "2024-03-01T00:00:00Z", "extra": 42 },
            { "id": "2", "title": "New", "createdAt": "2024-03-01T00:00:00Z", "updatedAt": "2024-03-02T00:00:00Z" },
            "garbage"
        ]);
        manager.write_json(PROJECTS_KEY, &legacy).unwrap();

        let report = manager.migrate_data();
        assert!(report.success);
        assert!(report.needed);
        assert_eq!(report.migrated, 1);
        assert_eq!(report.skipped, 1);

        let stored: Value =
            serde_json::from_str(&manager.backend().get_item(PROJECTS_KEY).unwrap().unwrap())
                .unwrap();
        assert_eq!(stored[0]["updatedAt"], "2024-03-01T00:00:00Z");
        assert_eq!(stored[0]["extra"], 42);
        assert_eq!(stored[2], "garbage");

        let again = manager.migrate_data();
        assert!(!again.needed);
    }

    #[test]
    fn test_migrate_leaves_non_array_alone() {
        let manager = StorageManager::new(MemoryBackend::new());
        manager.backend().set_item(PROJECTS_KEY, r#"{"a":1}"#).unwrap();

        let report = manager.migrate_data();
        assert!(!report.success);
        assert_eq!(
            manager.backend().get_item(PROJECTS_KEY).unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }
}
