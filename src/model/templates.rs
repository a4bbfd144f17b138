//! Built-in photography templates.
//!
//! Applying a template replaces the equipment list, the checklist and the
//! inspiration board with the template's entries.

use crate::error::{PlannerError, Result};
use crate::model::entities::{
    ChecklistItem, Equipment, EquipmentType, InspirationCategory, InspirationImage, Priority,
    TaskCategory,
};
use crate::model::project::{Project, ProjectType, ShootingSettings};

/// A reusable starting point for a shoot.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub project_type: ProjectType,
    pub description: &'static str,
    pub equipment: &'static [&'static str],
    pub checklist: &'static [&'static str],
    pub duration_hours: f64,
    pub special_requirements: &'static [&'static str],
    pub inspiration: &'static [&'static str],
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "portrait-classic",
        name: "Classic portrait",
        project_type: ProjectType::Portrait,
        description: "Personal and artistic portraits in natural light",
        equipment: &["DSLR body", "85mm lens", "50mm lens", "Reflector", "Tripod"],
        checklist: &[
            "Confirm location and time",
            "Prepare wardrobe and props",
            "Charge batteries and format cards",
            "Set camera parameters",
            "Discuss style with the model",
            "Prepare a backup plan",
        ],
        duration_hours: 2.0,
        special_requirements: &["Natural light", "Posing guidance", "Composition"],
        inspiration: &["Natural light portrait", "Emotive expression", "Environmental portrait"],
    },
    Template {
        id: "product-commercial",
        name: "Commercial product",
        project_type: ProjectType::Product,
        description: "Studio product shots for e-commerce and advertising",
        equipment: &["Camera body", "100mm macro lens", "Softboxes", "Light tent", "Tripod"],
        checklist: &[
            "Collect product samples",
            "Clean and prep products",
            "Build the lighting setup",
            "Confirm shot list with the client",
            "Tether camera to laptop",
        ],
        duration_hours: 4.0,
        special_requirements: &["Studio lighting", "Clean background"],
        inspiration: &["Minimal product layout", "Reflection control", "Detail close-ups"],
    },
    Template {
        id: "wedding-documentary",
        name: "Wedding documentary",
        project_type: ProjectType::Wedding,
        description: "Full-day wedding coverage with a documentary style",
        equipment: &["Two camera bodies", "24-70mm lens", "70-200mm lens", "Speedlights", "Spare batteries"],
        checklist: &[
            "Get the day's schedule from the couple",
            "Scout ceremony and reception venues",
            "Agree on the family group list",
            "Coordinate with the second shooter",
            "Prepare backup cards",
        ],
        duration_hours: 10.0,
        special_requirements: &["Second shooter", "Low-light coverage"],
        inspiration: &["Getting ready", "First look", "Candid reception moments"],
    },
    Template {
        id: "landscape-golden-hour",
        name: "Golden hour landscape",
        project_type: ProjectType::Landscape,
        description: "Landscape session planned around sunrise or sunset",
        equipment: &["Camera body", "16-35mm lens", "ND filters", "Tripod", "Headlamp"],
        checklist: &[
            "Check the weather forecast",
            "Look up sunrise and sunset times",
            "Plan the hike and parking",
            "Pack filters and remote release",
        ],
        duration_hours: 3.0,
        special_requirements: &["Golden hour timing", "Weather backup date"],
        inspiration: &["Leading lines", "Long exposure water", "Silhouettes"],
    },
    Template {
        id: "event-documentary",
        name: "Event documentary",
        project_type: ProjectType::Event,
        description: "Conferences, celebrations and performances covered as they happen",
        equipment: &["Fast camera body", "Zoom lens", "Speedlight", "Spare batteries", "Memory cards"],
        checklist: &[
            "Get the event run sheet",
            "Prepare camera gear",
            "Confirm photo access and permissions",
            "Pack backup equipment",
            "Plan shooting positions",
            "Schedule same-day edits",
        ],
        duration_hours: 6.0,
        special_requirements: &["Fast capture", "Switching between rooms", "Candid close-ups"],
        inspiration: &["Documentary framing", "Decisive moments", "Faces in the crowd", "Venue atmosphere"],
    },
    Template {
        id: "commercial-corporate",
        name: "Corporate commercial",
        project_type: ProjectType::Commercial,
        description: "Company branding, team headshots and office environments",
        equipment: &["Camera body", "Standard lens", "Wide-angle lens", "Studio lights", "Tripod"],
        checklist: &[
            "Clarify the brief with the company",
            "Write the shoot plan",
            "Coordinate schedules with staff",
            "Prepare lighting kit",
            "Book post-production time",
            "Agree on delivery standards",
        ],
        duration_hours: 4.0,
        special_requirements: &["Professional look", "Office environment", "Brand tone"],
        inspiration: &["Corporate identity", "Workspace details", "Team collaboration", "Executive portraits"],
    },
];

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Apply a template to a project.
///
/// Generated entity ids derive from the template id so re-applying the same
/// template yields the same ids.
pub fn apply_template(project: &Project, template_id: &str) -> Result<Project> {
    let template = find_template(template_id).ok_or_else(|| PlannerError::UnknownTemplate {
        id: template_id.to_string(),
    })?;

    let equipment = template
        .equipment
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Equipment::basic(
                format!("template-{}-{}", template.id, i),
                *name,
                EquipmentType::Camera,
                true,
            )
        })
        .collect();

    let checklist = template
        .checklist
        .iter()
        .enumerate()
        .map(|(i, task)| ChecklistItem {
            id: format!("template-{}-task-{}", template.id, i),
            task: task.to_string(),
            completed: false,
            due_date: None,
            assigned_to: None,
            priority: Priority::Medium,
            category: TaskCategory::Creative,
        })
        .collect();

    let inspiration_images = template
        .inspiration
        .iter()
        .enumerate()
        .map(|(i, title)| InspirationImage {
            id: format!("template-{}-inspiration-{}", template.id, i),
            url: String::new(),
            title: title.to_string(),
            description: Some(format!("Reference images for {}", title)),
            tags: vec![title.to_string()],
            category: InspirationCategory::Other,
        })
        .collect();

    let mut templates = project.templates.clone();
    if !templates.iter().any(|t| t == template.id) {
        templates.push(template.id.to_string());
    }

    Ok(Project {
        project_type: template.project_type,
        shooting_settings: ShootingSettings {
            duration: template.duration_hours,
            special_requirements: template
                .special_requirements
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..project.shooting_settings.clone()
        },
        equipment,
        checklist,
        inspiration_images,
        templates,
        ..project.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::NewProject;
    use chrono::Utc;

    #[test]
    fn test_template_ids_unique() {
        for (i, a) in TEMPLATES.iter().enumerate() {
            for b in &TEMPLATES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_apply_template() {
        let mut draft = NewProject::titled("Beach wedding");
        draft.shooting_settings.start_time = Some("10:00".to_string());
        let p = Project::create(draft, Utc::now()).unwrap();

        let applied = apply_template(&p, "wedding-documentary").unwrap();
        assert_eq!(applied.project_type, ProjectType::Wedding);
        assert_eq!(applied.checklist.len(), 5);
        assert_eq!(applied.equipment.len(), 5);
        assert_eq!(applied.templates, vec!["wedding-documentary"]);
        assert_eq!(applied.shooting_settings.duration, 10.0);
        assert_eq!(applied.shooting_settings.start_time.as_deref(), Some("10:00"));

        let twice = apply_template(&applied, "wedding-documentary").unwrap();
        assert_eq!(twice.templates.len(), 1);
        assert_eq!(twice.checklist, applied.checklist);
    }

    #[test]
    fn test_every_project_type_but_other_has_a_template() {
        for project_type in [
            ProjectType::Portrait,
            ProjectType::Landscape,
            ProjectType::Product,
            ProjectType::Wedding,
            ProjectType::Event,
            ProjectType::Commercial,
        ] {
            assert!(
                TEMPLATES.iter().any(|t| t.project_type == project_type),
                "no template for {}",
                project_type
            );
        }

        let p = Project::create(NewProject::titled("Launch party"), Utc::now()).unwrap();
        let applied = apply_template(&p, "event-documentary").unwrap();
        assert_eq!(applied.project_type, ProjectType::Event);
        assert_eq!(applied.checklist.len(), 6);
    }

    #[test]
    fn test_unknown_template() {
        let p = Project::create(NewProject::titled("X"), Utc::now()).unwrap();
        assert!(matches!(
            apply_template(&p, "nope"),
            Err(PlannerError::UnknownTemplate { .. })
        ));
    }
}
