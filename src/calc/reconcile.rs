use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_balance_change, sum_balances, BudgetCalculator};
use crate::domain::{Amount, Budget, Expense};
use crate::errors::ValidationError;

/// Direction of the gap between the reported and the tracked balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BalanceStatus {
    /// The user holds more than the categories account for.
    More,
    /// The user holds less than the categories account for.
    Less,
    Same,
}

impl BalanceStatus {
    pub fn code(&self) -> &'static str {
        match self {
            BalanceStatus::More => "balance_more",
            BalanceStatus::Less => "balance_less",
            BalanceStatus::Same => "balance_same",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceComparison {
    pub fact: Amount,
    pub tracked: Amount,
    pub diff: Amount,
    pub status: BalanceStatus,
}

impl BalanceComparison {
    pub fn needs_fix(&self) -> bool {
        self.diff != 0
    }
}

/// Corrective spend to post against the Daily bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixPlan {
    pub category_id: String,
    pub amount: Amount,
    pub date: NaiveDate,
    pub new_balance: Amount,
}

/// `fact − Σ balances`; positive means more money than tracked.
pub fn compute_diff(fact_balance: Amount, expenses: &[Expense]) -> Amount {
    fact_balance - sum_balances(expenses)
}

pub fn compare_balances(fact_balance: Amount, expenses: &[Expense]) -> BalanceComparison {
    let tracked = sum_balances(expenses);
    let diff = fact_balance - tracked;
    let status = match diff {
        d if d > 0 => BalanceStatus::More,
        d if d < 0 => BalanceStatus::Less,
        _ => BalanceStatus::Same,
    };
    BalanceComparison {
        fact: fact_balance,
        tracked,
        diff,
        status,
    }
}

impl BudgetCalculator {
    /// Plans the corrective spend for `diff`, or `None` when balances already agree.
    ///
    /// The spend is dated at the budget start, charged to the Daily bucket with
    /// `amount = −diff`, and rejected if the Daily balance would go negative.
    pub fn plan_fix(&self, budget: &Budget, diff: Amount) -> Result<Option<FixPlan>, ValidationError> {
        if diff == 0 {
            return Ok(None);
        }
        let daily = self.require_daily(&budget.expenses)?;
        let amount = -diff;
        let new_balance = check_balance_change(daily.balance, 0, amount)?;
        Ok(Some(FixPlan {
            category_id: daily.id.clone(),
            amount,
            date: budget.date_start,
            new_balance,
        }))
    }
}
