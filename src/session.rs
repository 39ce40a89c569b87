//! Session lifecycle around the ledger: every state slice is loaded once
//! when the session opens, and the affected slice is saved synchronously
//! after every successful mutation.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    errors::{LedgerError, Result},
    ledger::{Bill, BudgetLedger, GoalUpdate, SpendingBreakdown},
    storage::StateStore,
    tasks::{TaskNote, TaskSink},
};

/// Slice keys used with the persistence collaborator.
pub const GOALS_KEY: &str = "goals";
pub const BILLS_KEY: &str = "bills";
pub const CATEGORIES_KEY: &str = "categories";
pub const INCOME_KEY: &str = "income";

/// Owns the ledger for one user session, together with its persistence
/// collaborator and an optional task-notification sink.
pub struct LedgerSession {
    ledger: BudgetLedger,
    store: Box<dyn StateStore>,
    tasks: Option<Box<dyn TaskSink>>,
}

impl std::fmt::Debug for LedgerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerSession")
            .field("ledger", &self.ledger)
            .field("has_task_sink", &self.tasks.is_some())
            .finish()
    }
}

impl LedgerSession {
    /// Loads all state slices from the store, starting empty where no prior
    /// state exists. Malformed slices are rejected at this boundary rather
    /// than tolerated per read site.
    pub fn open(store: Box<dyn StateStore>) -> Result<Self> {
        let goals = load_slice(store.as_ref(), GOALS_KEY, Vec::new())?;
        let bills = load_slice(store.as_ref(), BILLS_KEY, Vec::new())?;
        let categories = load_slice(store.as_ref(), CATEGORIES_KEY, Vec::new())?;
        let monthly_income = load_slice(store.as_ref(), INCOME_KEY, 0.0)?;
        let ledger = BudgetLedger {
            goals,
            bills,
            categories,
            monthly_income,
        };
        tracing::debug!(
            goals = ledger.goals.len(),
            bills = ledger.bills.len(),
            categories = ledger.categories.len(),
            "ledger session opened"
        );
        Ok(Self {
            ledger,
            store,
            tasks: None,
        })
    }

    /// Registers the collaborator that receives bill reminders.
    pub fn with_task_sink(mut self, sink: Box<dyn TaskSink>) -> Self {
        self.tasks = Some(sink);
        self
    }

    pub fn ledger(&self) -> &BudgetLedger {
        &self.ledger
    }

    pub fn add_goal(&mut self, name: &str, target_amount: f64) -> Result<Uuid> {
        let id = self.ledger.add_goal(name, target_amount)?;
        self.save_goals()?;
        Ok(id)
    }

    pub fn contribute(&mut self, goal_id: Uuid, amount: f64) -> Result<GoalUpdate> {
        let update = self.ledger.contribute(goal_id, amount)?;
        self.save_goals()?;
        Ok(update)
    }

    pub fn withdraw(&mut self, goal_id: Uuid, amount: f64) -> Result<GoalUpdate> {
        let update = self.ledger.withdraw(goal_id, amount)?;
        self.save_goals()?;
        Ok(update)
    }

    pub fn remove_goal(&mut self, goal_id: Uuid) -> Result<bool> {
        let removed = self.ledger.remove_goal(goal_id);
        if removed {
            self.save_goals()?;
        }
        Ok(removed)
    }

    /// Adds a bill and, when a task sink is registered, forwards the
    /// matching reminder note.
    pub fn add_bill(&mut self, name: &str, amount: f64, due_date: NaiveDate) -> Result<Bill> {
        let bill = self.ledger.add_bill(name, amount, due_date)?;
        self.save_bills()?;
        if let Some(sink) = self.tasks.as_mut() {
            sink.push_task(TaskNote::for_bill(&bill));
        }
        Ok(bill)
    }

    pub fn delete_bill(&mut self, bill_id: Uuid) -> Result<bool> {
        let removed = self.ledger.delete_bill(bill_id);
        if removed {
            self.save_bills()?;
        }
        Ok(removed)
    }

    pub fn add_category(&mut self, name: &str, limit: f64) -> Result<()> {
        self.ledger.add_category(name, limit)?;
        self.save_categories()
    }

    pub fn edit_category_limit(&mut self, name: &str, new_limit: f64) -> Result<()> {
        self.ledger.edit_category_limit(name, new_limit)?;
        self.save_categories()
    }

    pub fn remove_category(&mut self, name: &str) -> Result<bool> {
        let removed = self.ledger.remove_category(name);
        if removed {
            self.save_categories()?;
        }
        Ok(removed)
    }

    pub fn add_spending(&mut self, category: &str, description: &str, amount: f64) -> Result<()> {
        self.ledger.add_spending(category, description, amount)?;
        self.save_categories()
    }

    pub fn remove_spending(&mut self, category: &str, index: usize) -> Result<bool> {
        let removed = self.ledger.remove_spending(category, index);
        if removed {
            self.save_categories()?;
        }
        Ok(removed)
    }

    pub fn set_income(&mut self, value: f64) -> Result<()> {
        self.ledger.set_income(value)?;
        self.save_slice(INCOME_KEY, &self.ledger.monthly_income)
    }

    pub fn breakdown(&self) -> SpendingBreakdown {
        self.ledger.breakdown()
    }

    fn save_goals(&self) -> Result<()> {
        self.save_slice(GOALS_KEY, &self.ledger.goals)
    }

    fn save_bills(&self) -> Result<()> {
        self.save_slice(BILLS_KEY, &self.ledger.bills)
    }

    fn save_categories(&self) -> Result<()> {
        self.save_slice(CATEGORIES_KEY, &self.ledger.categories)
    }

    fn save_slice<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.store.save(key, &value)
    }
}

fn load_slice<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
    default: T,
) -> Result<T> {
    match store.load(key)? {
        Some(value) => serde_json::from_value(value)
            .map_err(|err| LedgerError::Storage(format!("malformed `{key}` slice: {err}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStore;

    struct SharedSink(Arc<Mutex<Vec<TaskNote>>>);

    impl TaskSink for SharedSink {
        fn push_task(&mut self, note: TaskNote) {
            self.0.lock().expect("sink lock poisoned").push(note);
        }
    }

    fn open_with_store() -> (LedgerSession, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let session = LedgerSession::open(Box::new(Arc::clone(&store))).expect("open session");
        (session, store)
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn opens_empty_without_prior_state() {
        let (session, _store) = open_with_store();
        assert!(session.ledger().goals.is_empty());
        assert!(session.ledger().bills.is_empty());
        assert!(session.ledger().categories.is_empty());
        assert_eq!(session.ledger().monthly_income, 0.0);
    }

    #[test]
    fn every_mutation_persists_its_slice() {
        let (mut session, store) = open_with_store();

        session.add_goal("Vacation", 500.0).unwrap();
        assert!(store.get(GOALS_KEY).is_some());

        session.add_bill("Rent", 1200.0, date("2024-01-01")).unwrap();
        assert!(store.get(BILLS_KEY).is_some());

        session.add_category("Groceries", 100.0).unwrap();
        session.add_spending("Groceries", "Eggs", 12.0).unwrap();
        let stored = store.get(CATEGORIES_KEY).unwrap();
        assert_eq!(stored[0]["spending"][0]["amount"], json!(12.0));

        session.set_income(2000.0).unwrap();
        assert_eq!(store.get(INCOME_KEY), Some(json!(2000.0)));
    }

    #[test]
    fn reload_reproduces_identical_state() {
        let (mut session, store) = open_with_store();
        let goal_id = session.add_goal("Vacation", 500.0).unwrap();
        session.contribute(goal_id, 200.0).unwrap();
        session.add_bill("Rent", 1200.0, date("2024-01-01")).unwrap();
        session.add_category("Groceries", 100.0).unwrap();
        session.add_spending("Groceries", "Eggs", 12.0).unwrap();
        session.set_income(2000.0).unwrap();

        let reloaded = LedgerSession::open(Box::new(Arc::clone(&store))).expect("reopen");
        assert_eq!(reloaded.ledger().goals, session.ledger().goals);
        assert_eq!(reloaded.ledger().bills, session.ledger().bills);
        assert_eq!(reloaded.ledger().categories, session.ledger().categories);
        assert_eq!(
            reloaded.ledger().monthly_income,
            session.ledger().monthly_income
        );
    }

    #[test]
    fn failed_validation_saves_nothing() {
        let (mut session, store) = open_with_store();
        session.add_category("Groceries", 100.0).unwrap();
        let saved = store.get(CATEGORIES_KEY).unwrap();

        let err = session.add_category("Groceries", 250.0).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(store.get(CATEGORIES_KEY).unwrap(), saved);
    }

    #[test]
    fn reached_goal_disappears_from_store_too() {
        let (mut session, store) = open_with_store();
        let goal_id = session.add_goal("Vacation", 500.0).unwrap();
        session.contribute(goal_id, 200.0).unwrap();
        let update = session.contribute(goal_id, 400.0).unwrap();

        assert!(update.reached);
        assert_eq!(update.current_amount, 500.0);
        assert_eq!(store.get(GOALS_KEY), Some(json!([])));
    }

    #[test]
    fn bill_creation_notifies_registered_sink_once() {
        let notes = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(MemoryStore::new());
        let mut session = LedgerSession::open(Box::new(Arc::clone(&store)))
            .expect("open")
            .with_task_sink(Box::new(SharedSink(Arc::clone(&notes))));

        session.add_bill("Rent", 1200.0, date("2024-01-01")).unwrap();

        let notes = notes.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Pay: Rent");
        assert_eq!(notes[0].due, date("2024-01-01"));
        assert_eq!(notes[0].status, "Due");
        assert_eq!(notes[0].notes, "Bill for $1200");
    }

    #[test]
    fn rejected_bill_emits_no_note() {
        let notes = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(MemoryStore::new());
        let mut session = LedgerSession::open(Box::new(store))
            .expect("open")
            .with_task_sink(Box::new(SharedSink(Arc::clone(&notes))));

        assert!(session.add_bill("", 1200.0, date("2024-01-01")).is_err());
        assert!(notes.lock().unwrap().is_empty());
    }

    #[test]
    fn malformed_slice_is_rejected_at_open() {
        let store = Arc::new(MemoryStore::new());
        store.seed(GOALS_KEY, json!({"not": "a list"}));

        let err = LedgerSession::open(Box::new(store)).unwrap_err();
        match err {
            LedgerError::Storage(message) => {
                assert!(message.contains("goals"), "unexpected error: {message}");
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[test]
    fn seeded_income_survives_open() {
        let store = Arc::new(MemoryStore::new());
        store.seed(INCOME_KEY, json!(1500.0));
        let session = LedgerSession::open(Box::new(store)).expect("open");
        assert_eq!(session.ledger().monthly_income, 1500.0);
    }
}
