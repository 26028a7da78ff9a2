mod common;

use std::fs;

use common::{category_id, create_sample, day, setup_config, USER};
use daily_budget::{
    calc::BudgetCalculator,
    config::Config,
    core::services::{BudgetService, ServiceContext, SpendService},
    domain::SpendDraft,
    storage::{paths, DocumentStore, JsonFileStore},
    utils::persistence::tmp_path,
};
use serde_json::Value;

#[test]
fn budget_survives_reopening_the_store() {
    let manager = setup_config();
    let config = Config::default();
    let calc = config.calculator();

    let (budget_id, spend_id) = {
        let store = manager.open_store(&config).unwrap();
        let ctx = ServiceContext::new(&store, &calc, USER);
        let mut budget = create_sample(&store, &calc);
        let rent = category_id(&budget, "Rent");
        let spend = SpendService::add(&ctx, &mut budget, day(2), &SpendDraft::new("Deposit", 250).in_category(&rent))
            .unwrap();
        (budget.id, spend.id)
    };

    let reopened = manager.open_store(&config).unwrap();
    let ctx = ServiceContext::new(&reopened, &calc, USER);
    let budget = BudgetService::load(&ctx, &budget_id).unwrap();
    assert_eq!(budget.expense(&category_id(&budget, "Rent")).unwrap().balance, 750);
    assert_eq!(budget.daily, 200);

    let spends = SpendService::list_by_date(&ctx, &budget_id, day(2)).unwrap();
    assert_eq!(spends.len(), 1);
    assert_eq!(spends[0].id, spend_id);
    assert_eq!(BudgetService::list_titles(&ctx, false).unwrap().len(), 1);
}

#[test]
fn store_file_is_versioned_json() {
    let manager = setup_config();
    let config = Config::default();
    let calc = BudgetCalculator::default();
    let store = manager.open_store(&config).unwrap();
    let budget = create_sample(&store, &calc);

    let raw = fs::read_to_string(store.path()).unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["schemaVersion"], 1);
    let key = paths::budget(USER, &budget.id).to_string();
    assert_eq!(parsed["documents"][key.as_str()]["title"], "January");
    assert!(!tmp_path(store.path()).exists());
}

#[test]
fn newer_schema_is_rejected() {
    let manager = setup_config();
    let path = manager.store_path(&Config::default());
    fs::write(&path, r#"{"schemaVersion": 99, "documents": {}}"#).unwrap();
    let err = JsonFileStore::open(&path).unwrap_err();
    assert_eq!(err.code(), "invalid-argument");
}

#[test]
fn failed_flush_keeps_file_and_memory_unchanged() {
    let manager = setup_config();
    let config = Config::default();
    let calc = BudgetCalculator::default();
    let store = manager.open_store(&config).unwrap();
    let mut budget = create_sample(&store, &calc);
    let ctx = ServiceContext::new(&store, &calc, USER);
    let before = fs::read_to_string(store.path()).unwrap();

    // a directory squatting on the staging path makes the write fail
    fs::create_dir(tmp_path(store.path())).unwrap();
    let err = SpendService::add(&ctx, &mut budget, day(1), &SpendDraft::new("Tea", 4)).unwrap_err();
    assert_eq!(err.code(), "io");

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    assert!(SpendService::list_by_date(&ctx, &budget.id, day(1)).unwrap().is_empty());
    let doc = store.get(&paths::budget(USER, &budget.id)).unwrap();
    assert!(doc.is_some());
}

#[test]
fn config_points_at_custom_store_file() {
    let manager = setup_config();
    let custom = manager.base_dir().join("nested").join("budgets.json");
    let config = Config {
        data_file: Some(custom.clone()),
        last_opened_budget: Some("abc".into()),
        ..Config::default()
    };
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    assert_eq!(loaded, config);
    assert_eq!(manager.store_path(&loaded), custom);

    let calc = loaded.calculator();
    let store = manager.open_store(&loaded).unwrap();
    create_sample(&store, &calc);
    assert!(custom.exists());
}

#[test]
fn corrupt_config_reports_serde_error() {
    let manager = setup_config();
    fs::write(manager.path(), "{ not json").unwrap();
    assert!(manager.load().is_err());
}
