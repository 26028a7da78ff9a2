//! Expense categories: planned buckets within a budget.

use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A named planned-spending bucket with a running balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: Amount,
    pub balance: Amount,
    pub order_index: u32,
}

impl Expense {
    pub fn new(id: impl Into<String>, title: impl Into<String>, amount: Amount, order_index: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            amount,
            balance: amount,
            order_index,
        }
    }

    /// Portion of the planned amount already taken by spends.
    pub fn consumed(&self) -> Amount {
        self.amount - self.balance
    }

    pub fn is_daily(&self, daily_title: &str) -> bool {
        self.title == daily_title
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Expense {
    fn title(&self) -> &str {
        &self.title
    }
}

/// Title and planned amount entered while drafting a budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: Amount,
}

impl ExpenseDraft {
    pub fn new(title: impl Into<String>, amount: Amount) -> Self {
        Self {
            title: title.into(),
            amount,
        }
    }
}

/// Target balance for one category inside a batched balance update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate<'a> {
    pub expense_id: &'a str,
    pub new_balance: Amount,
}

/// Moves the item at `from` to `to` and rewrites every `order_index` by position.
pub fn move_and_reindex(expenses: &mut Vec<Expense>, from: usize, to: usize) {
    if from >= expenses.len() || to >= expenses.len() {
        return;
    }
    let item = expenses.remove(from);
    expenses.insert(to, item);
    for (index, expense) in expenses.iter_mut().enumerate() {
        expense.order_index = index as u32;
    }
}
