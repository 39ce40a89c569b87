//! Task-notification collaborator: bills surface as to-do reminders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::Bill;

/// Status stamped on task notes created for new bills.
pub const TASK_STATUS_DUE: &str = "Due";

/// Record handed to the task collaborator when a bill is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskNote {
    pub title: String,
    pub due: NaiveDate,
    pub status: String,
    pub notes: String,
}

impl TaskNote {
    /// Builds the reminder note for a freshly created bill.
    pub fn for_bill(bill: &Bill) -> Self {
        Self {
            title: format!("Pay: {}", bill.name),
            due: bill.due_date,
            status: TASK_STATUS_DUE.to_string(),
            notes: format!("Bill for ${}", bill.amount),
        }
    }
}

/// Receives task notes emitted by the ledger session. Registering a sink is
/// optional; without one, bill creation emits nothing.
pub trait TaskSink: Send {
    fn push_task(&mut self, note: TaskNote);
}
