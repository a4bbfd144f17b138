//! Record-level migration of stored projects.
//!
//! Older releases stored projects in shapes the current model no longer
//! reads directly: snake_case keys copied from the hosted backend, checklist
//! items with `description` instead of `task`, missing `updatedAt`, and dates
//! without an offset. Migration runs on raw JSON so fields it does not know
//! about survive untouched.
//!
//! Steps are applied in order to every record. A record that is not an
//! object, or has no creation timestamp under either spelling, is skipped.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::state::revive::{canonical, parse_date_lenient, revive_date_string};

/// Version written into export documents.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

/// A migration step edits one project object and reports whether it changed it.
type MigrationStep = fn(&mut Map<String, Value>) -> bool;

/// Ordered migration registry.
const MIGRATION_STEPS: &[(&str, MigrationStep)] = &[
    ("rename_legacy_keys", rename_legacy_keys),
    ("legacy_checklist_text", legacy_checklist_text),
    ("legacy_inspiration_fields", legacy_inspiration_fields),
    ("ensure_updated_at", ensure_updated_at),
    ("canonicalize_dates", canonicalize_dates),
];

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Migrated,
    Unchanged,
    Skipped,
}

/// Warn when a document comes from a different schema version.
///
/// Documents are still accepted; record migration handles known differences.
pub fn check_document_version(version: Option<&str>) {
    if let Some(version) = version {
        if version != CURRENT_SCHEMA_VERSION {
            warn!(
                version,
                current = CURRENT_SCHEMA_VERSION,
                "document version may not be compatible"
            );
        }
    }
}

/// Migrate one stored project in place.
pub fn migrate_record(record: &mut Value) -> RecordOutcome {
    let Some(obj) = record.as_object_mut() else {
        return RecordOutcome::Skipped;
    };
    if !obj.contains_key("createdAt") && !obj.contains_key("created_at") {
        return RecordOutcome::Skipped;
    }

    let mut changed = false;
    for (name, step) in MIGRATION_STEPS {
        if step(obj) {
            debug!(step = name, id = ?obj.get("id"), "migration step applied");
            changed = true;
        }
    }

    if changed {
        RecordOutcome::Migrated
    } else {
        RecordOutcome::Unchanged
    }
}

/// Move `from` to `to` unless `to` is already present.
fn rename_key(obj: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if obj.contains_key(to) {
        return false;
    }
    match obj.remove(from) {
        Some(value) => {
            obj.insert(to.to_string(), value);
            true
        }
        None => false,
    }
}

/// Apply `f` to every object inside the array at `key`.
fn each_object<F>(obj: &mut Map<String, Value>, key: &str, mut f: F) -> bool
where
    F: FnMut(&mut Map<String, Value>) -> bool,
{
    let mut changed = false;
    if let Some(Value::Array(items)) = obj.get_mut(key) {
        for item in items.iter_mut() {
            if let Some(item) = item.as_object_mut() {
                changed |= f(item);
            }
        }
    }
    changed
}

fn rename_legacy_keys(obj: &mut Map<String, Value>) -> bool {
    const PROJECT_KEYS: &[(&str, &str)] = &[
        ("created_at", "createdAt"),
        ("updated_at", "updatedAt"),
        ("shoot_date", "shootDate"),
        ("cover_image", "coverImage"),
        ("inspiration_images", "inspirationImages"),
        ("shooting_settings", "shootingSettings"),
    ];

    let mut changed = false;
    for (from, to) in PROJECT_KEYS {
        changed |= rename_key(obj, from, to);
    }
    changed |= each_object(obj, "checklist", |item| {
        rename_key(item, "due_date", "dueDate") | rename_key(item, "assigned_to", "assignedTo")
    });
    changed |= each_object(obj, "team", |member| {
        rename_key(member, "payment_status", "paymentStatus")
    });
    changed |= each_object(obj, "inspirationImages", |image| {
        rename_key(image, "image_url", "url")
    });
    changed
}

fn legacy_checklist_text(obj: &mut Map<String, Value>) -> bool {
    each_object(obj, "checklist", |item| rename_key(item, "description", "task"))
}

/// Legacy inspiration entries carried `notes` and no title.
fn legacy_inspiration_fields(obj: &mut Map<String, Value>) -> bool {
    each_object(obj, "inspirationImages", |image| {
        let mut changed = rename_key(image, "notes", "description");
        if !image.contains_key("title") {
            let title = image
                .get("description")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .or_else(|| image.get("url").and_then(Value::as_str))
                .unwrap_or("Untitled")
                .to_string();
            image.insert("title".to_string(), Value::String(title));
            changed = true;
        }
        changed
    })
}

fn ensure_updated_at(obj: &mut Map<String, Value>) -> bool {
    let Some(created) = obj.get("createdAt").cloned() else {
        return false;
    };

    match obj.get("updatedAt").cloned() {
        None | Some(Value::Null) => {
            obj.insert("updatedAt".to_string(), created);
            true
        }
        Some(Value::String(updated)) => {
            let created_at = created.as_str().and_then(parse_date_lenient);
            let updated_at = parse_date_lenient(&updated);
            match (created_at, updated_at) {
                (Some(c), Some(u)) if u < c => {
                    obj.insert("updatedAt".to_string(), Value::String(canonical(&c)));
                    true
                }
                _ => false,
            }
        }
        Some(_) => false,
    }
}

/// Rewrite a date field that is not RFC 3339 yet, including bare dates.
fn fix_date_field(obj: &mut Map<String, Value>, key: &str) -> bool {
    let Some(Value::String(s)) = obj.get(key) else {
        return false;
    };
    match revive_date_string(s) {
        Some(fixed) => {
            obj.insert(key.to_string(), Value::String(fixed));
            true
        }
        None => false,
    }
}

fn canonicalize_dates(obj: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    for key in ["createdAt", "updatedAt", "shootDate"] {
        changed |= fix_date_field(obj, key);
    }
    changed |= each_object(obj, "checklist", |item| fix_date_field(item, "dueDate"));
    changed |= each_object(obj, "expenses", |expense| fix_date_field(expense, "date"));
    if let Some(client) = obj.get_mut("client").and_then(Value::as_object_mut) {
        changed |= fix_date_field(client, "deliveryDate");
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_record_unchanged() {
        let mut record = json!({
            "id": "1",
            "title": "Spring",
            "createdAt": "2024-03-01T00:00:00Z",
            "updatedAt": "2024-03-05T00:00:00Z",
            "checklist": [{ "id": "a", "task": "Scout", "completed": true }]
        });
        let before = record.clone();

        assert_eq!(migrate_record(&mut record), RecordOutcome::Unchanged);
        assert_eq!(record, before);
    }

    #[test]
    fn test_missing_updated_at_copied_from_created_at() {
        let mut record = json!({ "id": "1", "title": "Spring", "createdAt": "2024-03-01T00:00:00Z" });

        assert_eq!(migrate_record(&mut record), RecordOutcome::Migrated);
        assert_eq!(record["updatedAt"], "2024-03-01T00:00:00Z");
    }

    #[test]
    fn test_updated_before_created_is_clamped() {
        let mut record = json!({
            "id": "1",
            "title": "Spring",
            "createdAt": "2024-03-05T00:00:00Z",
            "updatedAt": "2024-03-01T00:00:00Z"
        });

        assert_eq!(migrate_record(&mut record), RecordOutcome::Migrated);
        assert_eq!(record["updatedAt"], "2024-03-05T00:00:00Z");
    }

    #[test]
    fn test_plain_date_strings_are_canonicalized() {
        let mut record = json!({
            "id": "1",
            "title": "Spring",
            "createdAt": "2024-03-01T00:00:00Z",
            "updatedAt": "2024-03-01T00:00:00Z",
            "shootDate": "2024-04-15",
            "checklist": [{ "id": "a", "task": "Scout", "dueDate": "2024-04-10T08:30:00" }],
            "expenses": [{ "id": "e", "description": "Studio", "amount": 100, "date": "2024-04-01" }],
            "client": { "name": "Acme", "deliveryDate": "2024-05-01" }
        });

        assert_eq!(migrate_record(&mut record), RecordOutcome::Migrated);
        assert_eq!(record["shootDate"], "2024-04-15T00:00:00Z");
        assert_eq!(record["checklist"][0]["dueDate"], "2024-04-10T08:30:00Z");
        assert_eq!(record["expenses"][0]["date"], "2024-04-01T00:00:00Z");
        assert_eq!(record["client"]["deliveryDate"], "2024-05-01T00:00:00Z");

        // A second pass has nothing left to do
        assert_eq!(migrate_record(&mut record), RecordOutcome::Unchanged);
    }

    #[test]
    fn test_snake_case_record() {
        let mut record = json!({
            "id": "1",
            "title": "Legacy",
            "created_at": "2024-03-01T00:00:00Z",
            "checklist": [{ "id": "a", "description": "Scout", "due_date": "2024-03-10", "completed": false }],
            "inspiration_images": [{ "id": "i", "image_url": "https://img.example/a.jpg", "notes": "Rim light" }]
        });

        assert_eq!(migrate_record(&mut record), RecordOutcome::Migrated);
        assert_eq!(record["createdAt"], "2024-03-01T00:00:00Z");
        assert_eq!(record["updatedAt"], "2024-03-01T00:00:00Z");
        assert_eq!(record["checklist"][0]["task"], "Scout");
        assert_eq!(record["checklist"][0]["dueDate"], "2024-03-10T00:00:00Z");
        assert_eq!(record["inspirationImages"][0]["url"], "https://img.example/a.jpg");
        assert_eq!(record["inspirationImages"][0]["title"], "Rim light");
        assert!(record.get("created_at").is_none());
    }

    #[test]
    fn test_unrecognized_shapes_skipped() {
        let mut not_object = json!("just a string");
        assert_eq!(migrate_record(&mut not_object), RecordOutcome::Skipped);

        let mut no_created = json!({ "id": "1", "title": "?" });
        let before = no_created.clone();
        assert_eq!(migrate_record(&mut no_created), RecordOutcome::Skipped);
        assert_eq!(no_created, before);
    }
}
