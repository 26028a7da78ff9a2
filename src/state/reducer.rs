use chrono::NaiveDate;

use super::actions::{Action, DaySnapshot};
use crate::calc::BalanceComparison;
use crate::domain::{Amount, Budget, BudgetTitle, Spend, UserData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing message key waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub code: String,
}

impl Notice {
    pub fn success(code: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            code: code.into(),
        }
    }

    pub fn error(code: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetState {
    pub budget: Option<Budget>,
    pub titles: Vec<BudgetTitle>,
    pub archived_titles: Vec<BudgetTitle>,
    pub current_date: Option<NaiveDate>,
    /// Spends of `current_date`.
    pub spend: Vec<Spend>,
    /// Daily-bucket spends dated before `current_date`.
    pub prior_daily_spend: Amount,
    pub last_comparison: Option<BalanceComparison>,
    pub loading: bool,
    pub error: Option<String>,
}

impl BudgetState {
    fn apply_day(&mut self, day: &DaySnapshot) {
        if self.current_date == Some(day.date) {
            self.spend = day.spend.clone();
            self.prior_daily_spend = day.prior_daily_spend;
        }
    }
}

/// Count of requests that have started but not yet produced an outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpinnerState {
    pub active_requests: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub user: UserData,
    pub budget: BudgetState,
    pub spinner: SpinnerState,
    pub notices: Vec<Notice>,
}

/// Applies `action` to `state`. Performs no I/O.
pub fn reduce(state: &mut AppState, action: &Action) {
    if action.is_request() {
        state.spinner.active_requests += 1;
        state.budget.loading = true;
        state.budget.error = None;
    } else if action.is_outcome() {
        state.spinner.active_requests = state.spinner.active_requests.saturating_sub(1);
        state.budget.loading = state.spinner.active_requests > 0;
    }

    let budget = &mut state.budget;
    match action {
        Action::AuthSuccess(user) => {
            state.user = user.clone();
        }
        Action::SetUser(user) => {
            if user.user_id != state.user.user_id {
                *budget = BudgetState {
                    current_date: budget.current_date,
                    loading: budget.loading,
                    ..BudgetState::default()
                };
            }
            state.user = user.clone();
        }
        Action::LoadBudgetTitlesSuccess { active, archived } => {
            budget.titles = active.clone();
            budget.archived_titles = archived.clone();
        }
        Action::LoadBudgetSuccess(loaded) => {
            budget.budget = Some(loaded.clone());
            budget.spend.clear();
            budget.prior_daily_spend = 0;
            budget.last_comparison = None;
        }
        Action::CreateBudgetSuccess(created) => {
            budget.budget = Some(created.clone());
            budget.spend.clear();
            budget.prior_daily_spend = 0;
            budget.last_comparison = None;
            state.notices.push(Notice::success("budget_created"));
        }
        Action::UpdateBudgetSuccess(updated) | Action::BudgetChanged(updated) => {
            budget.budget = Some(updated.clone());
        }
        Action::ArchiveChanged { budget_id, archived } => {
            if let Some(current) = budget.budget.as_mut().filter(|b| &b.id == budget_id) {
                current.is_archived = *archived;
            }
        }
        Action::SelectDate(date) => {
            if budget.current_date != Some(*date) {
                budget.current_date = Some(*date);
                budget.spend.clear();
                budget.prior_daily_spend = 0;
            }
        }
        Action::LoadDaySuccess(day) => budget.apply_day(day),
        Action::SpendChanged { budget: updated, day } => {
            budget.budget = Some(updated.clone());
            budget.apply_day(day);
        }
        Action::CompareBalanceSuccess(comparison) => {
            budget.last_comparison = Some(comparison.clone());
            state.notices.push(Notice::success(comparison.status.code()));
        }
        Action::BalanceFixed { budget: updated, day } => {
            budget.budget = Some(updated.clone());
            if let Some(day) = day {
                budget.apply_day(day);
            }
            budget.last_comparison = None;
            state.notices.push(Notice::success("balance_fixed"));
        }
        Action::Failure { code, .. } => {
            budget.error = Some(code.clone());
            state.notices.push(Notice::error(code.clone()));
        }
        Action::DismissNotices => state.notices.clear(),
        _ => {}
    }
}
