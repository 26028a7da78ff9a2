//! Read-only projections of [`AppState`].

use super::reducer::AppState;
use crate::calc::{self, BudgetCalculator};
use crate::domain::{spend::sum_for_category, Amount, Budget};

pub fn current_budget(state: &AppState) -> Option<&Budget> {
    state.budget.budget.as_ref()
}

pub fn current_budget_id(state: &AppState) -> Option<&str> {
    current_budget(state).map(|budget| budget.id.as_str())
}

pub fn daily_category_id<'a>(state: &'a AppState, calculator: &BudgetCalculator) -> Option<&'a str> {
    current_budget(state)
        .and_then(|budget| calculator.find_daily(&budget.expenses))
        .map(|daily| daily.id.as_str())
}

/// Allowance for the selected day, or `None` when no budget/day is selected
/// or the day lies outside the budget.
pub fn today_allowance(state: &AppState, calculator: &BudgetCalculator) -> Option<Amount> {
    let budget = current_budget(state)?;
    let date = state.budget.current_date?;
    let range = budget.range().ok()?;
    let daily = calculator.find_daily(&budget.expenses)?;
    calculator
        .compute_today_allowance(date, &range, daily, state.budget.prior_daily_spend)
        .ok()
}

/// Daily-bucket spending on the selected day.
pub fn todays_daily_spend(state: &AppState, calculator: &BudgetCalculator) -> Amount {
    match daily_category_id(state, calculator) {
        Some(daily_id) => sum_for_category(&state.budget.spend, daily_id),
        None => 0,
    }
}

pub fn todays_left(state: &AppState, calculator: &BudgetCalculator) -> Option<Amount> {
    let allowance = today_allowance(state, calculator)?;
    Some(calc::todays_left(allowance, todays_daily_spend(state, calculator)))
}

pub fn is_busy(state: &AppState) -> bool {
    state.spinner.active_requests > 0
}
