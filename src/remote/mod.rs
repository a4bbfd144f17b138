//! Hosted backend row shapes.
//!
//! The hosted database stores projects in snake_case rows with child tables
//! for team, checklist, expenses, inspiration, equipment and clients. Those
//! rows carry fewer fields than the local model, so conversion is explicit in
//! both directions:
//!
//! - [`to_remote`] drops local-only data (shooting settings, props, wardrobe,
//!   task priority and category, payment status, extended equipment details,
//!   the client's delivery plan). Client requirements travel as row notes.
//! - [`from_remote`] fills those fields with their defaults.
//!
//! Nothing here talks to the network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    ChecklistItem, ClientInfo, Equipment, EquipmentType, Expense, ExpenseCategory,
    ExpenseStatus, InspirationCategory, InspirationImage, Priority, Project, ProjectStatus,
    ProjectType, ShootingSettings, TaskCategory, TeamMember,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProjectRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    #[serde(default)]
    pub shoot_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub team: Vec<RemoteTeamMember>,
    #[serde(default)]
    pub checklist: Vec<RemoteChecklistItem>,
    #[serde(default)]
    pub expenses: Vec<RemoteExpense>,
    #[serde(default)]
    pub inspiration_images: Vec<RemoteInspiration>,
    #[serde(default)]
    pub equipment: Vec<RemoteEquipment>,
    #[serde(default)]
    pub clients: Vec<RemoteClient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTeamMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteChecklistItem {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteExpense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub status: ExpenseStatus,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteInspiration {
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEquipment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteClient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ============================================================================
// Local -> remote
// ============================================================================

/// Convert a project into its hosted row shape.
pub fn to_remote(project: &Project) -> RemoteProjectRow {
    RemoteProjectRow {
        id: project.id.clone(),
        title: project.title.clone(),
        description: project.description.clone(),
        project_type: project.project_type,
        status: project.status,
        shoot_date: project.shoot_date,
        location: project.location.clone(),
        budget: project.budget,
        concept: project.concept.clone(),
        mood: project.mood.clone(),
        notes: project.notes.clone(),
        cover_image: project.cover_image.clone(),
        created_at: project.created_at,
        updated_at: project.updated_at,
        team: project
            .team
            .iter()
            .map(|m| RemoteTeamMember {
                id: m.id.clone(),
                name: m.name.clone(),
                role: present(&m.role),
                rate: m.rate,
                confirmed: m.confirmed,
                contact: present(&m.contact),
            })
            .collect(),
        checklist: project
            .checklist
            .iter()
            .map(|t| RemoteChecklistItem {
                id: t.id.clone(),
                description: t.task.clone(),
                due_date: t.due_date,
                completed: t.completed,
                assigned_to: t.assigned_to.clone(),
            })
            .collect(),
        expenses: project
            .expenses
            .iter()
            .map(|e| RemoteExpense {
                id: e.id.clone(),
                description: e.description.clone(),
                amount: e.amount,
                category: e.category,
                status: e.status,
                date: e.date,
            })
            .collect(),
        inspiration_images: project
            .inspiration_images
            .iter()
            .map(|i| RemoteInspiration {
                id: i.id.clone(),
                image_url: i.url.clone(),
                notes: i.description.clone(),
                tags: (!i.tags.is_empty()).then(|| i.tags.clone()),
            })
            .collect(),
        equipment: project
            .equipment
            .iter()
            .map(|e| RemoteEquipment {
                id: e.id.clone(),
                name: e.name.clone(),
                quantity: None,
                notes: e.notes.clone(),
            })
            .collect(),
        clients: project
            .client
            .iter()
            .map(|c| client_row(project, c))
            .collect(),
    }
}

/// The single local client becomes one client row owned by the project.
fn client_row(project: &Project, client: &ClientInfo) -> RemoteClient {
    let contact = present(&client.contact);
    let (email, phone) = match contact {
        Some(c) if c.contains('@') => (Some(c), None),
        other => (None, other),
    };
    RemoteClient {
        id: format!("{}-client", project.id),
        name: client.name.clone(),
        contact_person: None,
        email,
        phone,
        company: client.company.clone(),
        notes: client.requirements.clone(),
        created_at: project.created_at,
        updated_at: project.updated_at,
    }
}

// ============================================================================
// Remote -> local
// ============================================================================

/// Convert a hosted row into a project, checking the project invariants.
///
/// Only the first client row is kept.
pub fn from_remote(row: RemoteProjectRow) -> Result<Project> {
    let client = row.clients.into_iter().next().map(|c| ClientInfo {
        name: c.name,
        contact: c
            .email
            .or(c.phone)
            .or(c.contact_person)
            .unwrap_or_default(),
        company: c.company,
        requirements: c.notes,
        delivery_format: Vec::new(),
        delivery_date: None,
        budget: None,
    });

    let project = Project {
        id: row.id,
        title: row.title,
        description: row.description,
        project_type: row.project_type,
        status: row.status,
        location: row.location,
        concept: row.concept,
        mood: row.mood,
        notes: row.notes,
        cover_image: row.cover_image,
        shoot_date: row.shoot_date,
        shooting_settings: ShootingSettings::default(),
        budget: row.budget,
        expenses: row
            .expenses
            .into_iter()
            .map(|e| Expense {
                id: e.id,
                description: e.description,
                amount: e.amount,
                category: e.category,
                status: e.status,
                date: e.date,
            })
            .collect(),
        equipment: row
            .equipment
            .into_iter()
            .map(|e| Equipment {
                notes: e.notes,
                ..Equipment::basic(e.id, e.name, EquipmentType::default(), true)
            })
            .collect(),
        props: Vec::new(),
        wardrobe: Vec::new(),
        team: row
            .team
            .into_iter()
            .map(|m| TeamMember {
                id: m.id,
                name: m.name,
                role: m.role.unwrap_or_default(),
                contact: m.contact.unwrap_or_default(),
                confirmed: m.confirmed,
                rate: m.rate,
                payment_status: Default::default(),
            })
            .collect(),
        inspiration_images: row
            .inspiration_images
            .into_iter()
            .map(|i| {
                let title = i
                    .notes
                    .as_deref()
                    .and_then(present)
                    .unwrap_or_else(|| i.image_url.clone());
                InspirationImage {
                    id: i.id,
                    url: i.image_url,
                    title,
                    description: i.notes,
                    tags: i.tags.unwrap_or_default(),
                    category: InspirationCategory::default(),
                }
            })
            .collect(),
        checklist: row
            .checklist
            .into_iter()
            .map(|t| ChecklistItem {
                id: t.id,
                task: t.description,
                completed: t.completed,
                due_date: t.due_date,
                assigned_to: t.assigned_to,
                priority: Priority::default(),
                category: TaskCategory::default(),
            })
            .collect(),
        client,
        templates: Vec::new(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    };

    project.check_invariants()?;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::model::mutators::{add_inspiration, add_task, add_team_member, set_client};
    use crate::model::{NewInspiration, NewProject, NewTask, NewTeamMember};
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Project {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut draft = NewProject::titled("Harbor editorial");
        draft.location = Some("Pier 7".to_string());
        draft.budget = Some(2500.0);
        let p = Project::create(draft, created).unwrap();

        let p = add_team_member(&p, NewTeamMember::new("Ana", "Stylist", "ana@example.com")).unwrap();
        let mut task = NewTask::new("Book boat");
        task.assigned_to = Some("Ana".to_string());
        let p = add_task(&p, task).unwrap();
        let p = add_inspiration(
            &p,
            NewInspiration {
                url: "https://img.example/fog.jpg".to_string(),
                title: "Fog".to_string(),
                description: Some("Morning fog".to_string()),
                tags: vec!["fog".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        set_client(
            &p,
            ClientInfo {
                name: "Tide Magazine".to_string(),
                contact: "+1 555 0100".to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_to_remote_uses_snake_case_shape() {
        let row = to_remote(&sample());
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["type"], "portrait");
        assert_eq!(value["checklist"][0]["description"], "Book boat");
        assert_eq!(value["checklist"][0]["assigned_to"], "Ana");
        assert_eq!(value["inspiration_images"][0]["image_url"], "https://img.example/fog.jpg");
        assert_eq!(value["clients"][0]["phone"], "+1 555 0100");
        assert!(value["clients"][0]["email"].is_null());
        assert!(value.get("createdAt").is_none());
        assert!(value.get("created_at").is_some());
    }

    #[test]
    fn test_round_trip_keeps_shared_fields() {
        let project = sample();
        let back = from_remote(to_remote(&project)).unwrap();

        assert_eq!(back.id, project.id);
        assert_eq!(back.title, project.title);
        assert_eq!(back.location, project.location);
        assert_eq!(back.budget, project.budget);
        assert_eq!(back.checklist[0].task, "Book boat");
        assert_eq!(back.team[0].contact, "ana@example.com");
        assert_eq!(back.inspiration_images[0].tags, vec!["fog"]);
        assert_eq!(back.client.as_ref().map(|c| c.contact.as_str()), Some("+1 555 0100"));
        assert_eq!(back.created_at, project.created_at);
    }

    #[test]
    fn test_from_remote_fills_defaults() {
        let row: RemoteProjectRow = serde_json::from_value(json!({
            "id": "r1",
            "title": "Remote",
            "type": "wedding",
            "status": "in-progress",
            "created_at": "2024-03-01T00:00:00Z",
            "updated_at": "2024-03-02T00:00:00Z",
            "inspiration_images": [{ "id": "i1", "image_url": "https://img.example/a.jpg" }],
            "clients": [{
                "id": "c1",
                "name": "Ada",
                "contact_person": "Ada L.",
                "created_at": "2024-03-01T00:00:00Z",
                "updated_at": "2024-03-01T00:00:00Z"
            }]
        }))
        .unwrap();

        let project = from_remote(row).unwrap();
        assert_eq!(project.project_type, ProjectType::Wedding);
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.inspiration_images[0].title, "https://img.example/a.jpg");
        assert_eq!(project.client.map(|c| c.contact), Some("Ada L.".to_string()));
        assert!(project.props.is_empty());
    }

    #[test]
    fn test_from_remote_rejects_inverted_timestamps() {
        let mut row = to_remote(&sample());
        row.updated_at = row.created_at - chrono::Duration::days(1);

        assert!(matches!(
            from_remote(row),
            Err(PlannerError::Validation { field: "updatedAt", .. })
        ));
    }
}
