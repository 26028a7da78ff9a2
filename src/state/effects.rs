use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::actions::{Action, DaySnapshot};
use super::reducer::AppState;
use crate::auth::AuthProvider;
use crate::calc::BudgetCalculator;
use crate::core::services::{
    BudgetService, ExpenseService, ReconcileService, ServiceContext, ServiceResult, SpendService,
};
use crate::domain::{Budget, Spend};
use crate::errors::BudgetError;
use crate::storage::DocumentStore;

/// Collaborators the effects layer talks to.
#[derive(Clone)]
pub struct EffectContext {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub calculator: BudgetCalculator,
}

impl EffectContext {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn AuthProvider>, calculator: BudgetCalculator) -> Self {
        Self {
            store,
            auth,
            calculator,
        }
    }

    fn services<'a>(&'a self, state: &'a AppState) -> ServiceResult<ServiceContext<'a>> {
        let user_id = state.user.user_id.as_deref().ok_or(BudgetError::NoUser)?;
        Ok(ServiceContext::new(self.store.as_ref(), &self.calculator, user_id))
    }
}

/// Runs the side effects of `action` against the state it produced and
/// returns the follow-up actions.
pub fn run_effects(ctx: &EffectContext, state: &AppState, action: &Action) -> Vec<Action> {
    let request = action.name();
    let result = if action.is_request() {
        handle_request(ctx, state, action).map(|outcome| vec![outcome])
    } else {
        Ok(follow_ups(state, action))
    };
    match result {
        Ok(actions) => actions,
        Err(err) => {
            warn!(request, code = %err.code(), error = %err, "request failed");
            vec![Action::Failure {
                request,
                code: err.code(),
            }]
        }
    }
}

fn follow_ups(state: &AppState, action: &Action) -> Vec<Action> {
    match action {
        Action::SetUser(user) if user.is_signed_in() => vec![Action::LoadBudgetTitles],
        Action::CreateBudgetSuccess(_) | Action::UpdateBudgetSuccess(_) | Action::ArchiveChanged { .. } => {
            vec![Action::LoadBudgetTitles]
        }
        Action::LoadBudgetSuccess(budget) => match state.budget.current_date {
            Some(date) if date_in_budget(budget, date) => vec![Action::LoadDay],
            _ => Vec::new(),
        },
        Action::SelectDate(date) => match &state.budget.budget {
            Some(budget) if date_in_budget(budget, *date) => vec![Action::LoadDay],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn date_in_budget(budget: &Budget, date: NaiveDate) -> bool {
    budget
        .range()
        .map(|range| range.contains(date))
        .unwrap_or(false)
}

fn handle_request(ctx: &EffectContext, state: &AppState, action: &Action) -> ServiceResult<Action> {
    debug!(request = action.name(), "running effect");
    match action {
        Action::SignIn { email, password } => Ok(Action::AuthSuccess(ctx.auth.sign_in(email, password)?)),
        Action::SignUp {
            email,
            password,
            name,
        } => Ok(Action::AuthSuccess(ctx.auth.sign_up(email, password, name)?)),
        Action::SignOut => {
            ctx.auth.sign_out()?;
            Ok(Action::AuthSuccess(ctx.auth.current()))
        }
        Action::UpdateProfile { name } => Ok(Action::AuthSuccess(ctx.auth.update_profile(Some(name.as_str()), None)?)),
        Action::LoadBudgetTitles => {
            let services = ctx.services(state)?;
            Ok(Action::LoadBudgetTitlesSuccess {
                active: BudgetService::list_titles(&services, false)?,
                archived: BudgetService::list_titles(&services, true)?,
            })
        }
        Action::LoadBudget { budget_id } => {
            let services = ctx.services(state)?;
            Ok(Action::LoadBudgetSuccess(BudgetService::load(&services, budget_id)?))
        }
        Action::CreateBudget(draft) => {
            let services = ctx.services(state)?;
            Ok(Action::CreateBudgetSuccess(BudgetService::create(&services, draft)?))
        }
        Action::UpdateBudget(patch) => {
            let services = ctx.services(state)?;
            let mut budget = current_budget(state)?;
            BudgetService::update(&services, &mut budget, patch)?;
            Ok(Action::UpdateBudgetSuccess(budget))
        }
        Action::SetArchived {
            budget_id,
            archived,
        } => {
            let services = ctx.services(state)?;
            let mut budget = BudgetService::load(&services, budget_id)?;
            if *archived {
                BudgetService::archive(&services, &mut budget)?;
            } else {
                BudgetService::restore(&services, &mut budget)?;
            }
            Ok(Action::ArchiveChanged {
                budget_id: budget_id.clone(),
                archived: *archived,
            })
        }
        Action::AddExpense(draft) => edit_budget(ctx, state, |services, budget| {
            ExpenseService::add(services, budget, draft).map(|_| ())
        }),
        Action::RenameExpense { expense_id, title } => edit_budget(ctx, state, |services, budget| {
            ExpenseService::rename(services, budget, expense_id, title)
        }),
        Action::ChangeExpenseAmount { expense_id, amount } => edit_budget(ctx, state, |services, budget| {
            ExpenseService::change_amount(services, budget, expense_id, *amount)
        }),
        Action::DeleteExpense { expense_id } => edit_budget(ctx, state, |services, budget| {
            ExpenseService::delete(services, budget, expense_id)
        }),
        Action::ReorderExpenses { from, to } => edit_budget(ctx, state, |services, budget| {
            ExpenseService::reorder(services, budget, *from, *to)
        }),
        Action::LoadDay => {
            let services = ctx.services(state)?;
            let budget = current_budget(state)?;
            Ok(Action::LoadDaySuccess(load_day(&services, &budget, selected_date(state)?)?))
        }
        Action::AddSpend(draft) => {
            let services = ctx.services(state)?;
            let mut budget = current_budget(state)?;
            let date = selected_date(state)?;
            SpendService::add(&services, &mut budget, date, draft)?;
            spend_changed(&services, budget, date)
        }
        Action::RenameSpend { spend_id, title } => {
            let services = ctx.services(state)?;
            let budget = current_budget(state)?;
            let mut spend = selected_spend(state, spend_id)?;
            SpendService::rename(&services, &budget.id, &mut spend, title)?;
            spend_changed(&services, budget, selected_date(state)?)
        }
        Action::ChangeSpendAmount { spend_id, amount } => {
            let services = ctx.services(state)?;
            let mut budget = current_budget(state)?;
            let mut spend = selected_spend(state, spend_id)?;
            SpendService::change_amount(&services, &mut budget, &mut spend, *amount)?;
            spend_changed(&services, budget, selected_date(state)?)
        }
        Action::ReassignSpend {
            spend_id,
            category_id,
        } => {
            let services = ctx.services(state)?;
            let mut budget = current_budget(state)?;
            let mut spend = selected_spend(state, spend_id)?;
            SpendService::reassign(&services, &mut budget, &mut spend, category_id)?;
            spend_changed(&services, budget, selected_date(state)?)
        }
        Action::DeleteSpend { spend_id } => {
            let services = ctx.services(state)?;
            let mut budget = current_budget(state)?;
            let spend = selected_spend(state, spend_id)?;
            SpendService::delete(&services, &mut budget, &spend)?;
            spend_changed(&services, budget, selected_date(state)?)
        }
        Action::CompareBalance { fact } => {
            let budget = current_budget(state)?;
            Ok(Action::CompareBalanceSuccess(ReconcileService::compare(&budget, *fact)?))
        }
        Action::FixBalance { fact } => {
            let services = ctx.services(state)?;
            let mut budget = current_budget(state)?;
            ReconcileService::apply_fix(&services, &mut budget, *fact)?;
            let day = match state.budget.current_date {
                Some(date) if date_in_budget(&budget, date) => Some(load_day(&services, &budget, date)?),
                _ => None,
            };
            Ok(Action::BalanceFixed { budget, day })
        }
        other => Err(BudgetError::InvalidOperation(format!(
            "`{}` is not a request",
            other.name()
        ))),
    }
}

fn current_budget(state: &AppState) -> ServiceResult<Budget> {
    state.budget.budget.clone().ok_or(BudgetError::NoBudget)
}

fn selected_date(state: &AppState) -> ServiceResult<NaiveDate> {
    state
        .budget
        .current_date
        .ok_or_else(|| BudgetError::InvalidOperation("no day selected".into()))
}

fn selected_spend(state: &AppState, spend_id: &str) -> ServiceResult<Spend> {
    state
        .budget
        .spend
        .iter()
        .find(|spend| spend.id == spend_id)
        .cloned()
        .ok_or_else(|| BudgetError::not_found("spend", spend_id))
}

fn edit_budget<F>(ctx: &EffectContext, state: &AppState, edit: F) -> ServiceResult<Action>
where
    F: FnOnce(&ServiceContext<'_>, &mut Budget) -> ServiceResult<()>,
{
    let services = ctx.services(state)?;
    let mut budget = current_budget(state)?;
    edit(&services, &mut budget)?;
    Ok(Action::BudgetChanged(budget))
}

fn load_day(services: &ServiceContext<'_>, budget: &Budget, date: NaiveDate) -> ServiceResult<DaySnapshot> {
    Ok(DaySnapshot {
        date,
        spend: SpendService::list_by_date(services, &budget.id, date)?,
        prior_daily_spend: SpendService::prior_daily_spend(services, budget, date)?,
    })
}

fn spend_changed(services: &ServiceContext<'_>, budget: Budget, date: NaiveDate) -> ServiceResult<Action> {
    let day = load_day(services, &budget, date)?;
    Ok(Action::SpendChanged { budget, day })
}
