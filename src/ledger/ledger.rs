use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

use super::{
    bill::Bill,
    breakdown::SpendingBreakdown,
    category::{SpendingCategory, SpendingEntry},
    goal::{SavingsGoal, GOAL_COLORS},
};

/// In-memory aggregate of goals, bills, categories, and income for one user
/// session.
///
/// Every operation validates its input before touching state; a failed call
/// returns a [`ValidationError`] and leaves the ledger exactly as it was.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetLedger {
    #[serde(default)]
    pub goals: Vec<SavingsGoal>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub categories: Vec<SpendingCategory>,
    #[serde(default)]
    pub monthly_income: f64,
}

/// Outcome of a goal contribution or withdrawal.
///
/// `reached` reports that the goal hit its target and was removed from the
/// active set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalUpdate {
    pub current_amount: f64,
    pub reached: bool,
}

impl BudgetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a goal with zero progress and the next palette color.
    pub fn add_goal(
        &mut self,
        name: impl Into<String>,
        target_amount: f64,
    ) -> Result<Uuid, ValidationError> {
        let name = name.into();
        require_filled(&name, "goal name")?;
        require_positive(target_amount, "target amount")?;
        let color = GOAL_COLORS[self.goals.len() % GOAL_COLORS.len()];
        let goal = SavingsGoal::new(name, target_amount, color);
        let id = goal.id;
        tracing::debug!(goal = %goal.name, %id, "added savings goal");
        self.goals.push(goal);
        Ok(id)
    }

    /// Moves money into a goal, clamping at the target amount. A goal that
    /// reaches its target is removed from the active set.
    pub fn contribute(&mut self, goal_id: Uuid, amount: f64) -> Result<GoalUpdate, ValidationError> {
        require_positive(amount, "amount")?;
        let index = self.goal_index(goal_id)?;
        let goal = &mut self.goals[index];
        goal.current_amount = (goal.current_amount + amount).min(goal.target_amount);
        Ok(self.finish_goal_update(index))
    }

    /// Moves money out of a goal, clamping at zero.
    pub fn withdraw(&mut self, goal_id: Uuid, amount: f64) -> Result<GoalUpdate, ValidationError> {
        require_positive(amount, "amount")?;
        let index = self.goal_index(goal_id)?;
        let goal = &mut self.goals[index];
        goal.current_amount = (goal.current_amount - amount).max(0.0);
        Ok(self.finish_goal_update(index))
    }

    /// Removes a goal outright. Idempotent.
    pub fn remove_goal(&mut self, goal_id: Uuid) -> bool {
        let before = self.goals.len();
        self.goals.retain(|goal| goal.id != goal_id);
        self.goals.len() != before
    }

    /// Appends a bill under the default category and returns it.
    pub fn add_bill(
        &mut self,
        name: impl Into<String>,
        amount: f64,
        due_date: NaiveDate,
    ) -> Result<Bill, ValidationError> {
        let name = name.into();
        require_filled(&name, "bill name")?;
        require_positive(amount, "bill amount")?;
        let bill = Bill::new(name, amount, due_date);
        tracing::debug!(bill = %bill.name, due = %bill.due_date, "added bill");
        self.bills.push(bill.clone());
        Ok(bill)
    }

    /// Removes a bill by id. Idempotent.
    pub fn delete_bill(&mut self, bill_id: Uuid) -> bool {
        let before = self.bills.len();
        self.bills.retain(|bill| bill.id != bill_id);
        self.bills.len() != before
    }

    /// Creates an empty spending category. Names must be unique (exact,
    /// case-sensitive match).
    pub fn add_category(
        &mut self,
        name: impl Into<String>,
        limit: f64,
    ) -> Result<(), ValidationError> {
        let name = name.into();
        require_filled(&name, "category name")?;
        require_positive(limit, "category limit")?;
        if self.categories.iter().any(|category| category.name == name) {
            return Err(ValidationError::DuplicateCategory(name));
        }
        tracing::debug!(category = %name, limit, "added spending category");
        self.categories.push(SpendingCategory::new(name, limit));
        Ok(())
    }

    /// Replaces a category's limit, preserving its spending log.
    pub fn edit_category_limit(
        &mut self,
        name: &str,
        new_limit: f64,
    ) -> Result<(), ValidationError> {
        require_positive(new_limit, "category limit")?;
        let category = self.category_mut(name)?;
        category.limit = new_limit;
        Ok(())
    }

    /// Removes a category by exact name. Idempotent.
    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|category| category.name != name);
        self.categories.len() != before
    }

    /// Logs an expense against a category.
    pub fn add_spending(
        &mut self,
        category_name: &str,
        description: impl Into<String>,
        amount: f64,
    ) -> Result<(), ValidationError> {
        let description = description.into();
        require_filled(&description, "spending description")?;
        require_positive(amount, "spending amount")?;
        let category = self.category_mut(category_name)?;
        category.spending.push(SpendingEntry {
            description,
            amount,
        });
        Ok(())
    }

    /// Drops the spending entry at `index`. No-op when the category or the
    /// index does not exist.
    pub fn remove_spending(&mut self, category_name: &str, index: usize) -> bool {
        match self
            .categories
            .iter_mut()
            .find(|category| category.name == category_name)
        {
            Some(category) if index < category.spending.len() => {
                category.spending.remove(index);
                true
            }
            _ => false,
        }
    }

    pub fn set_income(&mut self, value: f64) -> Result<(), ValidationError> {
        require_positive(value, "monthly income")?;
        self.monthly_income = value;
        Ok(())
    }

    /// Pure derived view over categories and income.
    pub fn breakdown(&self) -> SpendingBreakdown {
        SpendingBreakdown::compute(&self.categories, self.monthly_income)
    }

    pub fn goal(&self, goal_id: Uuid) -> Option<&SavingsGoal> {
        self.goals.iter().find(|goal| goal.id == goal_id)
    }

    pub fn category(&self, name: &str) -> Option<&SpendingCategory> {
        self.categories.iter().find(|category| category.name == name)
    }

    fn goal_index(&self, goal_id: Uuid) -> Result<usize, ValidationError> {
        self.goals
            .iter()
            .position(|goal| goal.id == goal_id)
            .ok_or(ValidationError::GoalNotFound(goal_id))
    }

    fn category_mut(&mut self, name: &str) -> Result<&mut SpendingCategory, ValidationError> {
        self.categories
            .iter_mut()
            .find(|category| category.name == name)
            .ok_or_else(|| ValidationError::CategoryNotFound(name.to_string()))
    }

    fn finish_goal_update(&mut self, index: usize) -> GoalUpdate {
        let current_amount = self.goals[index].current_amount;
        let reached = self.goals[index].is_reached();
        if reached {
            let goal = self.goals.remove(index);
            tracing::info!(goal = %goal.name, "savings goal reached, leaving active set");
        }
        GoalUpdate {
            current_amount,
            reached,
        }
    }
}

fn require_filled(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

// NaN and infinities fail the comparison, so they are rejected alongside
// zero and negatives.
fn require_positive(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount(field))
    }
}
