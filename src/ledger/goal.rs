use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::breakdown::round2;

/// Palette cycled through as goals are created, indexed by goal count.
pub const GOAL_COLORS: [&str; 6] = [
    "#b350e0", "#ffd700", "#5ddcbe", "#f7931e", "#6b21a8", "#e871ef",
];

/// A named savings target with current progress.
///
/// Invariant: `0 <= current_amount <= target_amount`. Mutations go through
/// [`BudgetLedger`](super::BudgetLedger), which clamps contributions and
/// withdrawals and drops the goal from the active set once the target is
/// reached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub color: String,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: f64, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount,
            current_amount: 0.0,
            color: color.into(),
        }
    }

    /// Progress toward the target, capped at 100 and rounded to two decimals.
    pub fn percent_complete(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        round2((self.current_amount / self.target_amount * 100.0).min(100.0))
    }

    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}
