use chrono::{Duration, NaiveDate};
use daily_budget::{
    calc::{days_between_inclusive, sum_balances, BudgetCalculator, DateRange},
    domain::{Budget, Expense, DEFAULT_DAILY_TITLE},
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
}

fn budget(total: i64, days: i64, categories: &[(&str, i64)]) -> Budget {
    let mut expenses: Vec<Expense> = categories
        .iter()
        .enumerate()
        .map(|(i, (title, amount))| Expense::new(format!("e{i}"), *title, *amount, i as u32))
        .collect();
    let categorized: i64 = categories.iter().map(|(_, amount)| amount).sum();
    expenses.push(Expense::new(
        "daily",
        DEFAULT_DAILY_TITLE,
        total - categorized,
        categories.len() as u32,
    ));
    Budget {
        id: "b".into(),
        title: "Feb".into(),
        date_start: start(),
        date_end: start() + Duration::days(days - 1),
        total,
        daily: 0,
        currency: "USD".into(),
        is_archived: false,
        expenses,
    }
}

#[test]
fn day_count_is_inclusive_for_every_length() {
    for len in 1..=400 {
        let end = start() + Duration::days(len - 1);
        assert_eq!(days_between_inclusive(start(), end).unwrap(), len);
    }
    assert_eq!(
        days_between_inclusive(start(), start() - Duration::days(1))
            .unwrap_err()
            .code(),
        "date_range_error"
    );
}

#[test]
fn daily_allowance_never_overspends_the_total() {
    let calc = BudgetCalculator::default();
    for total in [1, 99, 1000, 3001, 12345] {
        for days in [1, 7, 10, 31] {
            let budget = budget(total, days, &[("Rent", total / 3)]);
            let range = budget.range().unwrap();
            let daily = calc.compute_daily(total, &range, &budget.expenses);
            let left = total - calc.sum_categorized(&budget.expenses);
            assert!(daily * days <= left, "total {total} days {days}");
            assert!((daily + 1) * days > left, "total {total} days {days}");
        }
    }
}

#[test]
fn daily_allowance_is_monotonic_in_total_and_commitments() {
    let calc = BudgetCalculator::default();
    for days in [1, 3, 10, 31] {
        let mut previous = None;
        for total in (0..=4000).step_by(37) {
            let budget = budget(total, days, &[("Rent", 1000)]);
            let daily = calc.compute_daily(total, &budget.range().unwrap(), &budget.expenses);
            if let Some(prev) = previous {
                assert!(daily >= prev, "total {total} days {days}");
            }
            previous = Some(daily);
        }

        let mut previous = None;
        for rent in (0..=4000).step_by(41) {
            let budget = budget(3000, days, &[("Rent", rent), ("Food", 150)]);
            let daily = calc.compute_daily(3000, &budget.range().unwrap(), &budget.expenses);
            if let Some(prev) = previous {
                assert!(daily <= prev, "rent {rent} days {days}");
            }
            previous = Some(daily);
        }
    }
}

#[test]
fn categorized_sum_ignores_order() {
    let calc = BudgetCalculator::default();
    let mut budget = budget(5000, 10, &[("Rent", 1000), ("Food", 700), ("Gym", 50)]);
    let forward = calc.sum_categorized(&budget.expenses);
    budget.expenses.rotate_left(2);
    assert_eq!(calc.sum_categorized(&budget.expenses), forward);
    assert_eq!(forward, 1750);
}

#[test]
fn accepted_amount_changes_keep_allowance_non_negative() {
    let calc = BudgetCalculator::default();
    let budget = budget(3000, 10, &[("Rent", 1000)]);
    for new_amount in (0..=3200).step_by(50) {
        let valid = calc.is_amount_change_valid(&budget, new_amount, 1000);
        let mut edited = budget.clone();
        edited.expenses[0].amount = new_amount;
        let range = edited.range().unwrap();
        let allowance = calc.compute_daily(edited.total, &range, &edited.expenses);
        assert_eq!(valid, allowance >= 0, "new amount {new_amount}");
    }
}

#[test]
fn recomputed_daily_bucket_keeps_total_balanced() {
    let calc = BudgetCalculator::default();
    let mut budget = budget(3000, 10, &[("Rent", 1000), ("Food", 500)]);
    budget.expenses[2].balance -= 400;
    budget.expenses[0].amount = 1200;
    let update = calc.recompute_daily_category(budget.total, &budget.expenses).unwrap();
    let daily = budget.expense_mut(&update.expense_id).unwrap();
    daily.amount = update.amount;
    daily.balance = update.balance;

    let planned: i64 = budget.expenses.iter().map(|e| e.amount).sum();
    assert_eq!(planned, budget.total);
    assert_eq!(sum_balances(&budget.expenses), 3000 - 400 - 200);
}

#[test]
fn today_allowance_is_stable_when_spending_exactly_the_allowance() {
    let calc = BudgetCalculator::default();
    let budget = budget(3000, 10, &[("Rent", 1000)]);
    let range = DateRange::new(budget.date_start, budget.date_end).unwrap();
    let daily = calc.find_daily(&budget.expenses).unwrap();
    let mut prior = 0;
    for offset in 0..10 {
        let date = start() + Duration::days(offset);
        let allowance = calc
            .compute_today_allowance(date, &range, daily, prior)
            .unwrap();
        assert_eq!(allowance, 200);
        prior += allowance;
    }
}
