//! Checklist assignee references.
//!
//! `ChecklistItem::assigned_to` holds a team member's display name rather than
//! an id. Removing or renaming a member therefore needs an explicit follow-up;
//! these helpers provide it. Deleting a member nulls out the assignee.

use std::collections::BTreeSet;

use crate::model::entities::ChecklistItem;
use crate::model::project::Project;

/// Clear every assignee equal to `name`.
pub fn unassign_member(project: &Project, name: &str) -> Project {
    Project {
        checklist: project
            .checklist
            .iter()
            .map(|t| {
                if t.assigned_to.as_deref() == Some(name) {
                    ChecklistItem {
                        assigned_to: None,
                        ..t.clone()
                    }
                } else {
                    t.clone()
                }
            })
            .collect(),
        ..project.clone()
    }
}

/// Rewrite assignees after a member was renamed.
pub fn rename_assignee(project: &Project, old_name: &str, new_name: &str) -> Project {
    Project {
        checklist: project
            .checklist
            .iter()
            .map(|t| {
                if t.assigned_to.as_deref() == Some(old_name) {
                    ChecklistItem {
                        assigned_to: Some(new_name.to_string()),
                        ..t.clone()
                    }
                } else {
                    t.clone()
                }
            })
            .collect(),
        ..project.clone()
    }
}

/// Assignee names that match no team member, sorted.
pub fn dangling_assignees(project: &Project) -> Vec<String> {
    let names: BTreeSet<&str> = project.team.iter().map(|m| m.name.as_str()).collect();
    project
        .checklist
        .iter()
        .filter_map(|t| t.assigned_to.as_deref())
        .filter(|a| !names.contains(a))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entities::{NewTask, NewTeamMember};
    use crate::model::mutators::{add_task, add_team_member};
    use crate::model::project::NewProject;
    use chrono::Utc;

    fn staffed_project() -> Project {
        let p = Project::create(NewProject::titled("Wedding"), Utc::now()).unwrap();
        let p = add_team_member(
            &p,
            NewTeamMember {
                name: "Wang".to_string(),
                role: "Makeup".to_string(),
                contact: "wang@example.com".to_string(),
                ..NewTeamMember::default()
            },
        )
        .unwrap();
        let mut task = NewTask::new("Trial makeup");
        task.assigned_to = Some("Wang".to_string());
        let p = add_task(&p, task).unwrap();
        let mut task = NewTask::new("Pick up flowers");
        task.assigned_to = Some("Li".to_string());
        add_task(&p, task).unwrap()
    }

    #[test]
    fn test_dangling_assignees() {
        assert_eq!(dangling_assignees(&staffed_project()), vec!["Li"]);
    }

    #[test]
    fn test_unassign_member() {
        let p = unassign_member(&staffed_project(), "Wang");
        assert!(p.checklist[0].assigned_to.is_none());
        assert_eq!(p.checklist[1].assigned_to.as_deref(), Some("Li"));
    }

    #[test]
    fn test_rename_assignee() {
        let p = rename_assignee(&staffed_project(), "Wang", "Wang Fang");
        assert_eq!(p.checklist[0].assigned_to.as_deref(), Some("Wang Fang"));
    }
}
