//! Budget arithmetic: day counting, category aggregation, allowance,
//! validation and reconciliation.
//!
//! Everything here is pure. Services call into [`BudgetCalculator`] before
//! touching the store so that rejected changes never reach persistence.

pub mod allowance;
pub mod reconcile;
pub mod time_range;
pub mod validator;

pub use allowance::{sum_balances, todays_left, DailyCategoryUpdate};
pub use reconcile::{compare_balances, compute_diff, BalanceComparison, BalanceStatus, FixPlan};
pub use time_range::{days_between_inclusive, DateRange};
pub use validator::{check_amount, check_balance_change};

use crate::domain::DEFAULT_DAILY_TITLE;

/// Calculator bound to the title that marks the Daily bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetCalculator {
    daily_title: String,
}

impl BudgetCalculator {
    pub fn new(daily_title: impl Into<String>) -> Self {
        Self {
            daily_title: daily_title.into(),
        }
    }

    pub fn daily_title(&self) -> &str {
        &self.daily_title
    }
}

impl Default for BudgetCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_TITLE)
    }
}
