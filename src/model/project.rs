//! The `Project` aggregate.
//!
//! A project is the top-level planning record for one shoot. It exclusively
//! owns every nested collection; nothing is shared between projects.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlannerError, Result};
use crate::model::entities::{
    ChecklistItem, ClientInfo, Equipment, Expense, InspirationImage, TeamMember,
};

/// Generate a new identifier for a project or nested entity.
///
/// UUIDv7 keeps the creation-time ordering of the old millisecond ids
/// without their collision window.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Portrait,
    Landscape,
    Product,
    Wedding,
    Event,
    Commercial,
    Other,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectType::Portrait => "portrait",
            ProjectType::Landscape => "landscape",
            ProjectType::Product => "product",
            ProjectType::Wedding => "wedding",
            ProjectType::Event => "event",
            ProjectType::Commercial => "commercial",
            ProjectType::Other => "other",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown project type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Scheduled,
    InProgress,
    Completed,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Scheduled => "scheduled",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown project status '{}'", s))
    }
}

/// Shoot-day timing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootingSettings {
    /// Planned length of the shoot in hours.
    #[serde(default)]
    pub duration: f64,

    /// Wall-clock start, `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// Wall-clock end, `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(default)]
    pub special_requirements: Vec<String>,
}

impl ShootingSettings {
    /// Check duration and time window.
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(PlannerError::validation(
                "duration",
                "must be a non-negative number of hours",
            ));
        }

        let start = parse_clock("startTime", self.start_time.as_deref())?;
        let end = parse_clock("endTime", self.end_time.as_deref())?;
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(PlannerError::validation(
                    "endTime",
                    "must not be earlier than the start time",
                ));
            }
        }

        Ok(())
    }
}

fn parse_clock(field: &'static str, value: Option<&str>) -> Result<Option<NaiveTime>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveTime::parse_from_str(v, "%H:%M")
            .map(Some)
            .map_err(|_| PlannerError::validation(field, format!("'{}' is not HH:MM", v))),
    }
}

/// Planning record for one photography shoot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique within the collection; never changes after creation.
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub project_type: ProjectType,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoot_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub shooting_settings: ShootingSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,

    #[serde(default)]
    pub expenses: Vec<Expense>,

    #[serde(default)]
    pub equipment: Vec<Equipment>,

    #[serde(default)]
    pub props: Vec<String>,

    #[serde(default)]
    pub wardrobe: Vec<String>,

    #[serde(default)]
    pub team: Vec<TeamMember>,

    #[serde(default)]
    pub inspiration_images: Vec<InspirationImage>,

    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,

    /// Ids of templates applied to this project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Everything a caller supplies when creating a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub location: Option<String>,
    pub concept: Option<String>,
    pub mood: Option<String>,
    pub notes: Option<String>,
    pub cover_image: Option<String>,
    pub shoot_date: Option<DateTime<Utc>>,
    pub shooting_settings: ShootingSettings,
    pub budget: Option<f64>,
}

impl NewProject {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Project {
    /// Create a project from a draft with a fresh id and timestamps.
    pub fn create(draft: NewProject, now: DateTime<Utc>) -> Result<Self> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(PlannerError::validation("title", "must not be empty"));
        }
        validate_money("budget", draft.budget)?;
        draft.shooting_settings.validate()?;

        Ok(Project {
            id: new_id(),
            title: title.to_string(),
            description: draft.description,
            project_type: draft.project_type,
            status: draft.status,
            location: draft.location,
            concept: draft.concept,
            mood: draft.mood,
            notes: draft.notes,
            cover_image: draft.cover_image,
            shoot_date: draft.shoot_date,
            shooting_settings: draft.shooting_settings,
            budget: draft.budget,
            expenses: Vec::new(),
            equipment: Vec::new(),
            props: Vec::new(),
            wardrobe: Vec::new(),
            team: Vec::new(),
            inspiration_images: Vec::new(),
            checklist: Vec::new(),
            client: None,
            templates: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Refresh `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Check the aggregate-level invariants.
    pub fn check_invariants(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PlannerError::validation("id", "must not be empty"));
        }
        if self.updated_at < self.created_at {
            return Err(PlannerError::validation(
                "updatedAt",
                format!("project {} was updated before it was created", self.id),
            ));
        }
        Ok(())
    }

    /// Check the invariants plus every nested amount and the shooting window.
    ///
    /// Applied to records arriving from outside, where the mutators that
    /// normally enforce these rules never ran.
    pub fn validate(&self) -> Result<()> {
        self.check_invariants()?;
        if self.title.trim().is_empty() {
            return Err(PlannerError::validation("title", "must not be empty"));
        }
        validate_money("budget", self.budget)?;
        self.shooting_settings.validate()?;

        for expense in &self.expenses {
            validate_money("amount", Some(expense.amount))?;
        }
        for member in &self.team {
            validate_money("rate", member.rate)?;
        }
        for item in &self.equipment {
            if let Some(rental) = &item.rental_info {
                validate_money("rentalCost", rental.rental_cost)?;
            }
        }
        if let Some(client) = &self.client {
            validate_money("client budget", client.budget)?;
        }
        Ok(())
    }

    /// Look up a checklist item.
    pub fn task(&self, task_id: &str) -> Option<&ChecklistItem> {
        self.checklist.iter().find(|t| t.id == task_id)
    }
}

/// Money-like values must be finite and non-negative when present.
pub(crate) fn validate_money(field: &'static str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(PlannerError::validation(
            field,
            format!("{} is not a non-negative amount", v),
        )),
        _ => Ok(()),
    }
}
