//! Project data model
//!
//! The `Project` aggregate, its nested entities, and the pure operations the
//! planner applies to them.

pub mod entities;
pub mod integrity;
pub mod mutators;
pub mod project;
pub mod stats;
pub mod templates;

pub use entities::{
    ChecklistItem, ClientInfo, Condition, Equipment, EquipmentType, Expense, ExpenseCategory,
    ExpenseStatus, InspirationCategory, InspirationImage, Maintenance, NewEquipment, NewExpense,
    NewInspiration, NewTask, NewTeamMember, PaymentStatus, Priority, RentalInfo, Specifications,
    TaskCategory, TeamMember, TeamMemberPatch,
};
pub use project::{new_id, NewProject, Project, ProjectStatus, ProjectType, ShootingSettings};
pub use stats::{budget_summary, project_stats, BudgetSummary, ProjectStats};
pub use templates::{apply_template, find_template, Template, TEMPLATES};
