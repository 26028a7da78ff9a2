//! Logged real-world expenditures.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// A spend counted against one day and, usually, one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Spend {
    pub id: String,
    pub title: String,
    pub amount: Amount,
    pub category_id: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Spend {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        amount: Amount,
        category_id: Option<String>,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            amount,
            category_id,
            date,
            created_at,
        }
    }

    pub fn belongs_to(&self, category_id: &str) -> bool {
        self.category_id.as_deref() == Some(category_id)
    }
}

impl Identifiable for Spend {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Spend {
    fn title(&self) -> &str {
        &self.title
    }
}

/// Input for logging a new spend. A missing category means the Daily bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendDraft {
    pub title: String,
    pub amount: Amount,
    pub category_id: Option<String>,
}

impl SpendDraft {
    pub fn new(title: impl Into<String>, amount: Amount) -> Self {
        Self {
            title: title.into(),
            amount,
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// Sums the amounts of `spends` attributed to `category_id`.
pub fn sum_for_category(spends: &[Spend], category_id: &str) -> Amount {
    spends
        .iter()
        .filter(|spend| spend.belongs_to(category_id))
        .map(|spend| spend.amount)
        .sum()
}
