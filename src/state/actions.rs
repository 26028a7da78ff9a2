use chrono::NaiveDate;

use crate::calc::BalanceComparison;
use crate::domain::{Amount, Budget, BudgetDraft, BudgetPatch, BudgetTitle, ExpenseDraft, Spend, SpendDraft, UserData};

/// Spends of the selected day plus the Daily total of earlier days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub spend: Vec<Spend>,
    pub prior_daily_spend: Amount,
}

/// Everything that can happen to [`super::AppState`].
///
/// Requests start work in the effects layer and are answered by exactly one
/// outcome: a success variant or [`Action::Failure`]. Events change state
/// without starting work of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // requests
    SignIn { email: String, password: String },
    SignUp { email: String, password: String, name: String },
    SignOut,
    UpdateProfile { name: String },
    LoadBudgetTitles,
    LoadBudget { budget_id: String },
    CreateBudget(BudgetDraft),
    UpdateBudget(BudgetPatch),
    SetArchived { budget_id: String, archived: bool },
    AddExpense(ExpenseDraft),
    RenameExpense { expense_id: String, title: String },
    ChangeExpenseAmount { expense_id: String, amount: Amount },
    DeleteExpense { expense_id: String },
    ReorderExpenses { from: usize, to: usize },
    LoadDay,
    AddSpend(SpendDraft),
    RenameSpend { spend_id: String, title: String },
    ChangeSpendAmount { spend_id: String, amount: Amount },
    ReassignSpend { spend_id: String, category_id: String },
    DeleteSpend { spend_id: String },
    CompareBalance { fact: Amount },
    FixBalance { fact: Amount },

    // outcomes
    AuthSuccess(UserData),
    LoadBudgetTitlesSuccess { active: Vec<BudgetTitle>, archived: Vec<BudgetTitle> },
    LoadBudgetSuccess(Budget),
    CreateBudgetSuccess(Budget),
    UpdateBudgetSuccess(Budget),
    ArchiveChanged { budget_id: String, archived: bool },
    BudgetChanged(Budget),
    LoadDaySuccess(DaySnapshot),
    SpendChanged { budget: Budget, day: DaySnapshot },
    CompareBalanceSuccess(BalanceComparison),
    BalanceFixed { budget: Budget, day: Option<DaySnapshot> },
    Failure { request: &'static str, code: String },

    // events
    SetUser(UserData),
    SelectDate(NaiveDate),
    DismissNotices,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SignIn { .. } => "sign_in",
            Action::SignUp { .. } => "sign_up",
            Action::SignOut => "sign_out",
            Action::UpdateProfile { .. } => "update_profile",
            Action::LoadBudgetTitles => "load_budget_titles",
            Action::LoadBudget { .. } => "load_budget",
            Action::CreateBudget(_) => "create_budget",
            Action::UpdateBudget(_) => "update_budget",
            Action::SetArchived { .. } => "set_archived",
            Action::AddExpense(_) => "add_expense",
            Action::RenameExpense { .. } => "rename_expense",
            Action::ChangeExpenseAmount { .. } => "change_expense_amount",
            Action::DeleteExpense { .. } => "delete_expense",
            Action::ReorderExpenses { .. } => "reorder_expenses",
            Action::LoadDay => "load_day",
            Action::AddSpend(_) => "add_spend",
            Action::RenameSpend { .. } => "rename_spend",
            Action::ChangeSpendAmount { .. } => "change_spend_amount",
            Action::ReassignSpend { .. } => "reassign_spend",
            Action::DeleteSpend { .. } => "delete_spend",
            Action::CompareBalance { .. } => "compare_balance",
            Action::FixBalance { .. } => "fix_balance",
            Action::AuthSuccess(_) => "auth_success",
            Action::LoadBudgetTitlesSuccess { .. } => "load_budget_titles_success",
            Action::LoadBudgetSuccess(_) => "load_budget_success",
            Action::CreateBudgetSuccess(_) => "create_budget_success",
            Action::UpdateBudgetSuccess(_) => "update_budget_success",
            Action::ArchiveChanged { .. } => "archive_changed",
            Action::BudgetChanged(_) => "budget_changed",
            Action::LoadDaySuccess(_) => "load_day_success",
            Action::SpendChanged { .. } => "spend_changed",
            Action::CompareBalanceSuccess(_) => "compare_balance_success",
            Action::BalanceFixed { .. } => "balance_fixed",
            Action::Failure { .. } => "failure",
            Action::SetUser(_) => "set_user",
            Action::SelectDate(_) => "select_date",
            Action::DismissNotices => "dismiss_notices",
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Action::SignIn { .. }
                | Action::SignUp { .. }
                | Action::SignOut
                | Action::UpdateProfile { .. }
                | Action::LoadBudgetTitles
                | Action::LoadBudget { .. }
                | Action::CreateBudget(_)
                | Action::UpdateBudget(_)
                | Action::SetArchived { .. }
                | Action::AddExpense(_)
                | Action::RenameExpense { .. }
                | Action::ChangeExpenseAmount { .. }
                | Action::DeleteExpense { .. }
                | Action::ReorderExpenses { .. }
                | Action::LoadDay
                | Action::AddSpend(_)
                | Action::RenameSpend { .. }
                | Action::ChangeSpendAmount { .. }
                | Action::ReassignSpend { .. }
                | Action::DeleteSpend { .. }
                | Action::CompareBalance { .. }
                | Action::FixBalance { .. }
        )
    }

    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            Action::AuthSuccess(_)
                | Action::LoadBudgetTitlesSuccess { .. }
                | Action::LoadBudgetSuccess(_)
                | Action::CreateBudgetSuccess(_)
                | Action::UpdateBudgetSuccess(_)
                | Action::ArchiveChanged { .. }
                | Action::BudgetChanged(_)
                | Action::LoadDaySuccess(_)
                | Action::SpendChanged { .. }
                | Action::CompareBalanceSuccess(_)
                | Action::BalanceFixed { .. }
                | Action::Failure { .. }
        )
    }

    /// Requests sharing a key replace each other while still queued; only the
    /// latest one runs.
    pub fn coalesce_key(&self) -> Option<String> {
        match self {
            Action::LoadBudgetTitles => Some("load_budget_titles".into()),
            Action::LoadBudget { .. } => Some("load_budget".into()),
            Action::LoadDay => Some("load_day".into()),
            Action::CompareBalance { .. } => Some("compare_balance".into()),
            Action::ChangeExpenseAmount { expense_id, .. } => {
                Some(format!("change_expense_amount:{expense_id}"))
            }
            Action::ChangeSpendAmount { spend_id, .. } => Some(format!("change_spend_amount:{spend_id}")),
            _ => None,
        }
    }
}
