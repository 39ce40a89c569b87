use serde::{Deserialize, Serialize};

/// A single logged expense within a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingEntry {
    pub description: String,
    pub amount: f64,
}

/// A named spending bucket with a limit and a log of individual expenses.
///
/// Names are unique within a ledger (exact, case-sensitive match).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingCategory {
    pub name: String,
    pub limit: f64,
    #[serde(default)]
    pub spending: Vec<SpendingEntry>,
}

impl SpendingCategory {
    pub fn new(name: impl Into<String>, limit: f64) -> Self {
        Self {
            name: name.into(),
            limit,
            spending: Vec::new(),
        }
    }

    /// Sum of all logged expenses.
    pub fn spent(&self) -> f64 {
        self.spending.iter().map(|entry| entry.amount).sum()
    }

    /// A category counts as over limit once spending meets the limit.
    pub fn is_over_limit(&self) -> bool {
        self.spent() >= self.limit
    }
}
