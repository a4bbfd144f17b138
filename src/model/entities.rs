//! Nested entities owned by a [`Project`](super::Project).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! display_as_serde {
    ($ty:ty { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let label = match self {
                    $(Self::$variant => $label),+
                };
                f.write_str(label)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(format!("unknown value '{}'", other)),
                }
            }
        }
    };
}

// ============================================================================
// Checklist
// ============================================================================

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

display_as_serde!(Priority { Low => "low", Medium => "medium", High => "high" });

/// Area of work a checklist task belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Equipment,
    Location,
    Team,
    Creative,
    Logistics,
    #[default]
    Other,
}

display_as_serde!(TaskCategory {
    Equipment => "equipment",
    Location => "location",
    Team => "team",
    Creative => "creative",
    Logistics => "logistics",
    Other => "other",
});

/// A to-do item on a project's checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,

    pub task: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Free-text name, usually matching a team member's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub category: TaskCategory,
}

impl ChecklistItem {
    /// Overdue is derived, never stored.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

/// Input for a new checklist item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub task: String,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub priority: Priority,
    pub category: TaskCategory,
}

impl NewTask {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Expenses
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Equipment,
    Location,
    Team,
    Props,
    Travel,
    #[default]
    Other,
}

display_as_serde!(ExpenseCategory {
    Equipment => "equipment",
    Location => "location",
    Team => "team",
    Props => "props",
    Travel => "travel",
    Other => "other",
});

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Equipment,
        ExpenseCategory::Location,
        ExpenseCategory::Team,
        ExpenseCategory::Props,
        ExpenseCategory::Travel,
        ExpenseCategory::Other,
    ];
}

/// Expense progress. Any transition between states is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[default]
    Planned,
    Confirmed,
    Paid,
}

display_as_serde!(ExpenseStatus {
    Planned => "planned",
    Confirmed => "confirmed",
    Paid => "paid",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub status: ExpenseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Input for a new expense.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub status: ExpenseStatus,
    pub date: Option<DateTime<Utc>>,
}

// ============================================================================
// Team
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    #[default]
    NotApplicable,
}

display_as_serde!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    NotApplicable => "not-applicable",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// Input for a new team member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTeamMember {
    pub name: String,
    pub role: String,
    pub contact: String,
    pub confirmed: bool,
    pub rate: Option<f64>,
    pub payment_status: PaymentStatus,
}

impl NewTeamMember {
    pub fn new(name: impl Into<String>, role: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            contact: contact.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a team member; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMemberPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub contact: Option<String>,
    pub confirmed: Option<bool>,
    pub rate: Option<Option<f64>>,
    pub payment_status: Option<PaymentStatus>,
}

// ============================================================================
// Inspiration
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspirationCategory {
    Pose,
    Lighting,
    Composition,
    Color,
    Mood,
    #[default]
    Other,
}

display_as_serde!(InspirationCategory {
    Pose => "pose",
    Lighting => "lighting",
    Composition => "composition",
    Color => "color",
    Mood => "mood",
    Other => "other",
});

/// A reference image for mood-boarding. Urls are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspirationImage {
    pub id: String,
    #[serde(default)]
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: InspirationCategory,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewInspiration {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub category: InspirationCategory,
}

/// Split a comma-separated tag string, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

// ============================================================================
// Equipment
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentType {
    #[default]
    Camera,
    Lens,
    Lighting,
    Tripod,
    Filter,
    Memory,
    Battery,
    Accessory,
}

display_as_serde!(EquipmentType {
    Camera => "camera",
    Lens => "lens",
    Lighting => "lighting",
    Tripod => "tripod",
    Filter => "filter",
    Memory => "memory",
    Battery => "battery",
    Accessory => "accessory",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
}

display_as_serde!(Condition {
    Excellent => "excellent",
    Good => "good",
    Fair => "fair",
    Poor => "poor",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aperture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub megapixels: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_range: Option<String>,
    /// Grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalInfo {
    #[serde(default)]
    pub is_rental: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_service: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_service: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_notes: Option<String>,
}

/// A piece of gear. Everything past `is_required` is only filled in by the
/// extended equipment editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub equipment_type: EquipmentType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Specifications>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_info: Option<RentalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<Maintenance>,
}

impl Equipment {
    /// Basic equipment record without extended details.
    pub fn basic(
        id: impl Into<String>,
        name: impl Into<String>,
        equipment_type: EquipmentType,
        is_required: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            equipment_type,
            is_required,
            brand: None,
            model: None,
            serial_number: None,
            notes: None,
            purchase_date: None,
            condition: None,
            specifications: None,
            rental_info: None,
            maintenance: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEquipment {
    pub name: String,
    pub equipment_type: EquipmentType,
    pub is_required: bool,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub notes: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub condition: Option<Condition>,
    pub specifications: Option<Specifications>,
    pub rental_info: Option<RentalInfo>,
    pub maintenance: Option<Maintenance>,
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default)]
    pub delivery_format: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::NotApplicable).unwrap(),
            "\"not-applicable\""
        );
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!("travel".parse::<ExpenseCategory>(), Ok(ExpenseCategory::Travel));
        assert!("boat".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_overdue_is_derived() {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap();
        let mut item = ChecklistItem {
            id: "t1".to_string(),
            task: "Scout location".to_string(),
            completed: false,
            due_date: Some(now - Duration::days(1)),
            assigned_to: None,
            priority: Priority::High,
            category: TaskCategory::Location,
        };
        assert!(item.is_overdue(now));

        item.completed = true;
        assert!(!item.is_overdue(now));

        item.completed = false;
        item.due_date = None;
        assert!(!item.is_overdue(now));
    }

    #[test]
    fn test_equipment_type_field_is_named_type() {
        let eq = Equipment::basic("e1", "85mm", EquipmentType::Lens, true);
        let json = serde_json::to_value(&eq).unwrap();
        assert_eq!(json["type"], "lens");
        assert_eq!(json["isRequired"], true);
        assert!(json.get("brand").is_none());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" warm, ,backlight ,"), vec!["warm", "backlight"]);
        assert!(parse_tags("").is_empty());
    }
}
