#![doc(test(attr(deny(warnings))))]

//! Daily Budget is the core of a personal-budgeting application: budgets over
//! inclusive date ranges, planned categories, daily spending, a per-day
//! allowance and reconciliation against the money actually held.

pub mod auth;
pub mod calc;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod state;
pub mod storage;
pub mod utils;

pub use errors::{BudgetError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(build = %utils::build_info::current(), "Daily Budget tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
