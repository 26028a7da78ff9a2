#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use daily_budget::{
    calc::BudgetCalculator,
    config::ConfigManager,
    core::services::{BudgetService, ServiceContext},
    domain::{Budget, BudgetDraft, ExpenseDraft},
    storage::DocumentStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const USER: &str = "user-1";

/// Creates an isolated base directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn setup_config() -> ConfigManager {
    ConfigManager::with_base_dir(temp_base()).expect("create config manager for temp dir")
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).expect("valid day")
}

/// 3000 over ten days with 1000 for rent: a 200 daily allowance.
pub fn sample_draft() -> BudgetDraft {
    BudgetDraft {
        title: "January".into(),
        date_start: day(1),
        date_end: day(10),
        total: 3000,
        currency: "USD".into(),
        expenses: vec![ExpenseDraft::new("Rent", 1000)],
    }
}

pub fn create_sample(store: &dyn DocumentStore, calculator: &BudgetCalculator) -> Budget {
    let ctx = ServiceContext::new(store, calculator, USER);
    BudgetService::create(&ctx, &sample_draft()).expect("create sample budget")
}

pub fn category_id(budget: &Budget, title: &str) -> String {
    budget
        .expenses
        .iter()
        .find(|expense| expense.title == title)
        .map(|expense| expense.id.clone())
        .expect("category present")
}
