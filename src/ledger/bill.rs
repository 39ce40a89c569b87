use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category stamped on bills created through the ledger.
pub const DEFAULT_BILL_CATEGORY: &str = "Other";

/// An upcoming payment obligation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub category: String,
}

impl Bill {
    pub fn new(name: impl Into<String>, amount: f64, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            due_date,
            category: DEFAULT_BILL_CATEGORY.into(),
        }
    }
}
