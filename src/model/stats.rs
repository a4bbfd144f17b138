//! Derived figures shown on the overview and budget screens.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::entities::ExpenseCategory;
use crate::model::project::Project;

/// Checklist progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    /// Whole percent, rounded half away from zero.
    pub completion_rate: u32,
    pub confirmed_members: usize,
    pub team_size: usize,
}

/// Money planned versus committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub planned_budget: f64,
    pub total_expenses: f64,
    pub team_costs: f64,
    pub total_spend: f64,
    /// Percent of the planned budget used; zero without a budget.
    pub usage_percent: f64,
    pub by_category: BTreeMap<String, f64>,
}

impl BudgetSummary {
    pub fn is_over_budget(&self) -> bool {
        self.planned_budget > 0.0 && self.total_spend > self.planned_budget
    }
}

pub fn project_stats(project: &Project, now: DateTime<Utc>) -> ProjectStats {
    let total_tasks = project.checklist.len();
    let completed_tasks = project.checklist.iter().filter(|t| t.completed).count();
    let overdue_tasks = project
        .checklist
        .iter()
        .filter(|t| t.is_overdue(now))
        .count();
    let completion_rate = if total_tasks > 0 {
        ((completed_tasks as f64 / total_tasks as f64) * 100.0).round() as u32
    } else {
        0
    };

    ProjectStats {
        total_tasks,
        completed_tasks,
        overdue_tasks,
        completion_rate,
        confirmed_members: project.team.iter().filter(|m| m.confirmed).count(),
        team_size: project.team.len(),
    }
}

pub fn budget_summary(project: &Project) -> BudgetSummary {
    let total_expenses: f64 = project.expenses.iter().map(|e| e.amount).sum();
    let team_costs: f64 = project.team.iter().filter_map(|m| m.rate).sum();
    let total_spend = total_expenses + team_costs;
    let planned_budget = project.budget.unwrap_or(0.0);
    let usage_percent = if planned_budget > 0.0 {
        total_spend / planned_budget * 100.0
    } else {
        0.0
    };

    let by_category = ExpenseCategory::ALL
        .iter()
        .map(|category| {
            let amount = project
                .expenses
                .iter()
                .filter(|e| e.category == *category)
                .map(|e| e.amount)
                .sum::<f64>();
            (category.to_string(), amount)
        })
        .collect();

    BudgetSummary {
        planned_budget,
        total_expenses,
        team_costs,
        total_spend,
        usage_percent,
        by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entities::{NewExpense, NewTask, NewTeamMember};
    use crate::model::mutators::{add_expense, add_task, add_team_member, toggle_task};
    use crate::model::project::NewProject;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_project_stats() {
        let p = Project::create(NewProject::titled("Spring"), now()).unwrap();
        let p = add_task(&p, NewTask::new("Scout")).unwrap();
        let mut late = NewTask::new("Permits");
        late.due_date = Some(now() - Duration::days(2));
        let p = add_task(&p, late).unwrap();
        let p = add_task(&p, NewTask::new("Props")).unwrap();
        let id = p.checklist[0].id.clone();
        let p = toggle_task(&p, &id);

        let stats = project_stats(&p, now());
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
        assert_eq!(stats.completion_rate, 33);
    }

    #[test]
    fn test_empty_checklist_rate_is_zero() {
        let p = Project::create(NewProject::titled("Empty"), now()).unwrap();
        assert_eq!(project_stats(&p, now()).completion_rate, 0);
    }

    #[test]
    fn test_budget_summary() {
        let mut draft = NewProject::titled("Watch");
        draft.budget = Some(3000.0);
        let p = Project::create(draft, now()).unwrap();
        let p = add_expense(
            &p,
            NewExpense {
                description: "Studio".to_string(),
                amount: 1200.0,
                category: ExpenseCategory::Location,
                ..NewExpense::default()
            },
        )
        .unwrap();
        let p = add_team_member(
            &p,
            NewTeamMember {
                name: "Zhang".to_string(),
                role: "Photographer".to_string(),
                contact: "13800138000".to_string(),
                rate: Some(800.0),
                ..NewTeamMember::default()
            },
        )
        .unwrap();

        let summary = budget_summary(&p);
        assert_relative_eq!(summary.total_spend, 2000.0);
        assert_relative_eq!(summary.usage_percent, 66.666_666, epsilon = 1e-4);
        assert_relative_eq!(summary.by_category["location"], 1200.0);
        assert_relative_eq!(summary.by_category["travel"], 0.0);
        assert!(!summary.is_over_budget());
    }

    #[test]
    fn test_budget_without_plan() {
        let p = Project::create(NewProject::titled("Free"), now()).unwrap();
        let summary = budget_summary(&p);
        assert_relative_eq!(summary.usage_percent, 0.0);
        assert!(!summary.is_over_budget());
    }
}
