//! Budget documents, drafts and partial updates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calc::DateRange;
use crate::domain::common::*;
use crate::domain::expense::{Expense, ExpenseDraft};
use crate::errors::ValidationError;

/// A user-owned spending plan over an inclusive date range.
///
/// The `expenses` list lives in a child collection and is therefore never
/// part of the serialized budget document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub total: Amount,
    pub daily: Amount,
    pub currency: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(skip)]
    pub expenses: Vec<Expense>,
}

impl Budget {
    pub fn range(&self) -> Result<DateRange, ValidationError> {
        DateRange::new(self.date_start, self.date_end)
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn expense_mut(&mut self, id: &str) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|expense| expense.id == id)
    }

    pub fn next_order_index(&self) -> u32 {
        self.expenses
            .iter()
            .map(|expense| expense.order_index + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn title_entry(&self) -> BudgetTitle {
        BudgetTitle {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    /// Applies the populated fields of `patch` in memory.
    pub fn apply(&mut self, patch: &BudgetPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(date_start) = patch.date_start {
            self.date_start = date_start;
        }
        if let Some(date_end) = patch.date_end {
            self.date_end = date_end;
        }
        if let Some(total) = patch.total {
            self.total = total;
        }
        if let Some(currency) = &patch.currency {
            self.currency = currency.clone();
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
    }
}

impl Identifiable for Budget {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Budget {
    fn title(&self) -> &str {
        &self.title
    }
}

/// Explicit partial update of a budget document. Only `Some` fields are written.
///
/// The stored `daily` allowance is derived and therefore not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl BudgetPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn total(total: Amount) -> Self {
        Self {
            total: Some(total),
            ..Self::default()
        }
    }

    pub fn dates(date_start: NaiveDate, date_end: NaiveDate) -> Self {
        Self {
            date_start: Some(date_start),
            date_end: Some(date_end),
            ..Self::default()
        }
    }

    pub fn archived(is_archived: bool) -> Self {
        Self {
            is_archived: Some(is_archived),
            ..Self::default()
        }
    }

    /// True when the change can move the daily allowance.
    pub fn affects_allowance(&self) -> bool {
        self.total.is_some() || self.date_start.is_some() || self.date_end.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Budget creation input, mirroring the creation form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDraft {
    pub title: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub total: Amount,
    pub currency: String,
    pub expenses: Vec<ExpenseDraft>,
}

impl BudgetDraft {
    /// Builds a draft from an existing budget, leaving out the Daily bucket.
    pub fn from_template(budget: &Budget, daily_title: &str) -> Self {
        let mut expenses: Vec<&Expense> = budget
            .expenses
            .iter()
            .filter(|expense| !expense.is_daily(daily_title))
            .collect();
        expenses.sort_by_key(|expense| expense.order_index);
        Self {
            title: budget.title.clone(),
            date_start: budget.date_start,
            date_end: budget.date_end,
            total: budget.total,
            currency: budget.currency.clone(),
            expenses: expenses
                .into_iter()
                .map(|expense| ExpenseDraft::new(expense.title.clone(), expense.amount))
                .collect(),
        }
    }

    pub fn categorised_total(&self) -> Amount {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }
}

/// Id/title projection used for budget pickers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetTitle {
    pub id: String,
    pub title: String,
}
