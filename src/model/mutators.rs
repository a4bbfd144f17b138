//! Pure update operations on a [`Project`].
//!
//! Every mutator borrows the current project and returns a new one with a
//! single nested collection (or field group) replaced. The input project is
//! never modified and `updated_at` is left alone; refreshing it is the job of
//! the caller that persists the result (see [`crate::state::ProjectStore`]).
//!
//! Operations addressing an id that does not exist return an unchanged copy.

use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::model::entities::{
    ChecklistItem, ClientInfo, Equipment, Expense, ExpenseStatus, InspirationImage,
    NewEquipment, NewExpense, NewInspiration, NewTask, NewTeamMember, TeamMember,
    TeamMemberPatch,
};
use crate::model::project::{new_id, validate_money, Project, ShootingSettings};

fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn amount(field: &'static str, value: f64) -> Result<f64> {
    validate_money(field, Some(value))?;
    Ok(value)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Checklist
// ============================================================================

pub fn add_task(project: &Project, input: NewTask) -> Result<Project> {
    let item = ChecklistItem {
        id: new_id(),
        task: required("task", &input.task)?,
        completed: false,
        due_date: input.due_date,
        assigned_to: non_blank(input.assigned_to),
        priority: input.priority,
        category: input.category,
    };
    debug!(project = %project.id, task = %item.id, "adding checklist item");

    let mut checklist = project.checklist.clone();
    checklist.push(item);
    Ok(Project {
        checklist,
        ..project.clone()
    })
}

pub fn toggle_task(project: &Project, task_id: &str) -> Project {
    Project {
        checklist: project
            .checklist
            .iter()
            .map(|t| {
                if t.id == task_id {
                    ChecklistItem {
                        completed: !t.completed,
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

/// Replace the editable fields of a task, keeping its id and completion flag.
pub fn update_task(project: &Project, task_id: &str, input: NewTask) -> Result<Project> {
    let task = required("task", &input.task)?;
    let assigned_to = non_blank(input.assigned_to);

    Ok(Project {
        checklist: project
            .checklist
            .iter()
            .map(|t| {
                if t.id == task_id {
                    ChecklistItem {
                        id: t.id.clone(),
                        task: task.clone(),
                        completed: t.completed,
                        due_date: input.due_date,
                        assigned_to: assigned_to.clone(),
                        priority: input.priority,
                        category: input.category,
                    }
                } else {
                    t.clone()
                }
            })
            .collect(),
        ..project.clone()
    })
}

pub fn remove_task(project: &Project, task_id: &str) -> Project {
    Project {
        checklist: project
            .checklist
            .iter()
            .filter(|t| t.id != task_id)
            .cloned()
            .collect(),
        ..project.clone()
    }
}

// ============================================================================
// Expenses
// ============================================================================

pub fn add_expense(project: &Project, input: NewExpense) -> Result<Project> {
    let expense = Expense {
        id: new_id(),
        description: required("description", &input.description)?,
        amount: amount("amount", input.amount)?,
        category: input.category,
        status: input.status,
        date: input.date,
    };
    debug!(project = %project.id, expense = %expense.id, amount = expense.amount, "adding expense");

    let mut expenses = project.expenses.clone();
    expenses.push(expense);
    Ok(Project {
        expenses,
        ..project.clone()
    })
}

pub fn update_expense_status(project: &Project, expense_id: &str, status: ExpenseStatus) -> Project {
    Project {
        expenses: project
            .expenses
            .iter()
            .map(|e| {
                if e.id == expense_id {
                    Expense {
                        status,
                        ..e.clone()
                    }
                } else {
                    e.clone()
                }
            })
            .collect(),
        ..project.clone()
    }
}

pub fn update_expense(project: &Project, expense_id: &str, input: NewExpense) -> Result<Project> {
    let description = required("description", &input.description)?;
    let value = amount("amount", input.amount)?;

    Ok(Project {
        expenses: project
            .expenses
            .iter()
            .map(|e| {
                if e.id == expense_id {
                    Expense {
                        id: e.id.clone(),
                        description: description.clone(),
                        amount: value,
                        category: input.category,
                        status: input.status,
                        date: input.date,
                    }
                } else {
                    e.clone()
                }
            })
            .collect(),
        ..project.clone()
    })
}

pub fn remove_expense(project: &Project, expense_id: &str) -> Project {
    Project {
        expenses: project
            .expenses
            .iter()
            .filter(|e| e.id != expense_id)
            .cloned()
            .collect(),
        ..project.clone()
    }
}

// ============================================================================
// Team
// ============================================================================

pub fn add_team_member(project: &Project, input: NewTeamMember) -> Result<Project> {
    validate_money("rate", input.rate)?;
    let member = TeamMember {
        id: new_id(),
        name: required("name", &input.name)?,
        role: required("role", &input.role)?,
        contact: required("contact", &input.contact)?,
        confirmed: input.confirmed,
        rate: input.rate,
        payment_status: input.payment_status,
    };
    debug!(project = %project.id, member = %member.id, "adding team member");

    let mut team = project.team.clone();
    team.push(member);
    Ok(Project {
        team,
        ..project.clone()
    })
}

/// Merge a partial update into one team member.
///
/// Renaming does not rewrite checklist assignees; use
/// [`crate::model::integrity::rename_assignee`] for that.
pub fn update_team_member(
    project: &Project,
    member_id: &str,
    patch: TeamMemberPatch,
) -> Result<Project> {
    let name = patch.name.as_deref().map(|n| required("name", n)).transpose()?;
    let role = patch.role.as_deref().map(|r| required("role", r)).transpose()?;
    let contact = patch
        .contact
        .as_deref()
        .map(|c| required("contact", c))
        .transpose()?;
    if let Some(rate) = patch.rate {
        validate_money("rate", rate)?;
    }

    Ok(Project {
        team: project
            .team
            .iter()
            .map(|m| {
                if m.id != member_id {
                    return m.clone();
                }
                TeamMember {
                    id: m.id.clone(),
                    name: name.clone().unwrap_or_else(|| m.name.clone()),
                    role: role.clone().unwrap_or_else(|| m.role.clone()),
                    contact: contact.clone().unwrap_or_else(|| m.contact.clone()),
                    confirmed: patch.confirmed.unwrap_or(m.confirmed),
                    rate: patch.rate.unwrap_or(m.rate),
                    payment_status: patch.payment_status.unwrap_or(m.payment_status),
                }
            })
            .collect(),
        ..project.clone()
    })
}

pub fn remove_team_member(project: &Project, member_id: &str) -> Project {
    Project {
        team: project
            .team
            .iter()
            .filter(|m| m.id != member_id)
            .cloned()
            .collect(),
        ..project.clone()
    }
}

// ============================================================================
// Equipment
// ============================================================================

fn build_equipment(id: String, input: NewEquipment) -> Result<Equipment> {
    if let Some(rental) = &input.rental_info {
        validate_money("rentalCost", rental.rental_cost)?;
    }
    Ok(Equipment {
        id,
        name: required("name", &input.name)?,
        equipment_type: input.equipment_type,
        is_required: input.is_required,
        brand: non_blank(input.brand),
        model: non_blank(input.model),
        serial_number: non_blank(input.serial_number),
        notes: non_blank(input.notes),
        purchase_date: input.purchase_date,
        condition: input.condition,
        specifications: input.specifications,
        rental_info: input.rental_info,
        maintenance: input.maintenance,
    })
}

pub fn add_equipment(project: &Project, input: NewEquipment) -> Result<Project> {
    let item = build_equipment(new_id(), input)?;
    debug!(project = %project.id, equipment = %item.id, "adding equipment");

    let mut equipment = project.equipment.clone();
    equipment.push(item);
    Ok(Project {
        equipment,
        ..project.clone()
    })
}

pub fn update_equipment(project: &Project, equipment_id: &str, input: NewEquipment) -> Result<Project> {
    let replacement = build_equipment(equipment_id.to_string(), input)?;

    Ok(Project {
        equipment: project
            .equipment
            .iter()
            .map(|e| {
                if e.id == equipment_id {
                    replacement.clone()
                } else {
                    e.clone()
                }
            })
            .collect(),
        ..project.clone()
    })
}

pub fn remove_equipment(project: &Project, equipment_id: &str) -> Project {
    Project {
        equipment: project
            .equipment
            .iter()
            .filter(|e| e.id != equipment_id)
            .cloned()
            .collect(),
        ..project.clone()
    }
}

// ============================================================================
// Inspiration
// ============================================================================

pub fn add_inspiration(project: &Project, input: NewInspiration) -> Result<Project> {
    let image = InspirationImage {
        id: new_id(),
        url: required("url", &input.url)?,
        title: required("title", &input.title)?,
        description: non_blank(input.description),
        tags: input
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        category: input.category,
    };

    let mut inspiration_images = project.inspiration_images.clone();
    inspiration_images.push(image);
    Ok(Project {
        inspiration_images,
        ..project.clone()
    })
}

pub fn remove_inspiration(project: &Project, image_id: &str) -> Project {
    Project {
        inspiration_images: project
            .inspiration_images
            .iter()
            .filter(|i| i.id != image_id)
            .cloned()
            .collect(),
        ..project.clone()
    }
}

// ============================================================================
// Props & wardrobe
// ============================================================================

fn push_unique(list: &[String], item: &str, field: &'static str) -> Result<Vec<String>> {
    let item = required(field, item)?;
    let mut next = list.to_vec();
    if !next.contains(&item) {
        next.push(item);
    }
    Ok(next)
}

pub fn add_prop(project: &Project, prop: &str) -> Result<Project> {
    Ok(Project {
        props: push_unique(&project.props, prop, "prop")?,
        ..project.clone()
    })
}

pub fn remove_prop(project: &Project, prop: &str) -> Project {
    Project {
        props: project.props.iter().filter(|p| *p != prop).cloned().collect(),
        ..project.clone()
    }
}

pub fn add_wardrobe_item(project: &Project, item: &str) -> Result<Project> {
    Ok(Project {
        wardrobe: push_unique(&project.wardrobe, item, "wardrobe")?,
        ..project.clone()
    })
}

pub fn remove_wardrobe_item(project: &Project, item: &str) -> Project {
    Project {
        wardrobe: project
            .wardrobe
            .iter()
            .filter(|w| *w != item)
            .cloned()
            .collect(),
        ..project.clone()
    }
}

// ============================================================================
// Client & settings
// ============================================================================

pub fn set_client(project: &Project, client: ClientInfo) -> Result<Project> {
    let name = required("client name", &client.name)?;
    let contact = required("client contact", &client.contact)?;
    validate_money("client budget", client.budget)?;

    let mut delivery_format: Vec<String> = Vec::new();
    for format in client.delivery_format {
        let format = format.trim().to_string();
        if !format.is_empty() && !delivery_format.contains(&format) {
            delivery_format.push(format);
        }
    }

    Ok(Project {
        client: Some(ClientInfo {
            name,
            contact,
            delivery_format,
            ..client
        }),
        ..project.clone()
    })
}

pub fn clear_client(project: &Project) -> Project {
    Project {
        client: None,
        ..project.clone()
    }
}

pub fn set_shooting_settings(project: &Project, settings: ShootingSettings) -> Result<Project> {
    settings.validate()?;
    Ok(Project {
        shooting_settings: settings,
        ..project.clone()
    })
}
