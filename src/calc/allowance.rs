use chrono::NaiveDate;

use super::{BudgetCalculator, DateRange};
use crate::domain::{floor_div, Amount, Expense};
use crate::errors::ValidationError;

/// New planned amount and balance for the Daily bucket after a recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCategoryUpdate {
    pub expense_id: String,
    pub amount: Amount,
    pub balance: Amount,
}

impl BudgetCalculator {
    /// Sum of planned amounts over every category except the Daily bucket.
    pub fn sum_categorized(&self, expenses: &[Expense]) -> Amount {
        expenses
            .iter()
            .filter(|expense| !expense.is_daily(&self.daily_title))
            .map(|expense| expense.amount)
            .sum()
    }

    pub fn find_daily<'a>(&self, expenses: &'a [Expense]) -> Option<&'a Expense> {
        expenses
            .iter()
            .find(|expense| expense.is_daily(&self.daily_title))
    }

    pub fn require_daily<'a>(&self, expenses: &'a [Expense]) -> Result<&'a Expense, ValidationError> {
        self.find_daily(expenses)
            .ok_or_else(|| ValidationError::MissingDailyCategory(self.daily_title.clone()))
    }

    /// Per-day allowance for the whole period: `floor((total − categorized) / days)`.
    pub fn compute_daily(&self, total: Amount, range: &DateRange, expenses: &[Expense]) -> Amount {
        floor_div(total - self.sum_categorized(expenses), range.days())
    }

    /// Allowance for a specific day, adapting to what earlier days consumed.
    ///
    /// `prior_daily_spend` is the sum of Daily-bucket spends dated before `date`.
    pub fn compute_today_allowance(
        &self,
        date: NaiveDate,
        range: &DateRange,
        daily: &Expense,
        prior_daily_spend: Amount,
    ) -> Result<Amount, ValidationError> {
        let days_left = range.days_remaining_from(date)?;
        Ok(floor_div(daily.amount - prior_daily_spend, days_left))
    }

    /// Rebuilds the Daily bucket so it absorbs whatever `total` leaves uncategorised,
    /// keeping the amount already consumed from it.
    pub fn recompute_daily_category(
        &self,
        total: Amount,
        expenses: &[Expense],
    ) -> Result<DailyCategoryUpdate, ValidationError> {
        let daily = self.require_daily(expenses)?;
        let amount = total - self.sum_categorized(expenses);
        Ok(DailyCategoryUpdate {
            expense_id: daily.id.clone(),
            amount,
            balance: amount - daily.consumed(),
        })
    }
}

/// Sum of every category balance, Daily included.
pub fn sum_balances(expenses: &[Expense]) -> Amount {
    expenses.iter().map(|expense| expense.balance).sum()
}

/// What is left of today's allowance after today's Daily spends.
pub fn todays_left(today_allowance: Amount, todays_daily_spend: Amount) -> Amount {
    today_allowance - todays_daily_spend
}
