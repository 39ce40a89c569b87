#![doc(test(attr(deny(warnings))))]

//! Arcadia Budget offers the ledger, savings-goal, and spending-breakdown
//! primitives behind Arcadia's budget tracker, plus the session lifecycle
//! that persists them and a small interactive CLI.

pub mod cli;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Arcadia Budget tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
