use serde_json::Value;
use tracing::{debug, info};

use crate::calc::check_amount;
use crate::domain::{Amount, Budget, BudgetDraft, BudgetPatch, BudgetTitle, Expense};
use crate::errors::BudgetError;
use crate::storage::{fields, from_document, query_as, to_document, FilterOp, Query, WriteBatch};

use super::{ServiceContext, ServiceResult};

pub struct BudgetService;

impl BudgetService {
    /// Validates `draft`, then writes the budget together with its categories
    /// and a Daily bucket holding the uncategorised remainder.
    pub fn create(ctx: &ServiceContext<'_>, draft: &BudgetDraft) -> ServiceResult<Budget> {
        let daily = ctx.calculator.check_creation(draft)?;
        let budget_id = ctx.store.new_id();

        let mut expenses: Vec<Expense> = draft
            .expenses
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Expense::new(ctx.store.new_id(), item.title.trim(), item.amount, index as u32)
            })
            .collect();
        expenses.push(Expense::new(
            ctx.store.new_id(),
            ctx.calculator.daily_title(),
            draft.total - draft.categorised_total(),
            expenses.len() as u32,
        ));

        let budget = Budget {
            id: budget_id.clone(),
            title: draft.title.trim().to_string(),
            date_start: draft.date_start,
            date_end: draft.date_end,
            total: draft.total,
            daily,
            currency: draft.currency.clone(),
            is_archived: false,
            expenses,
        };

        let mut batch = WriteBatch::new();
        batch.set(ctx.budget(&budget_id), to_document(&budget)?);
        for expense in &budget.expenses {
            batch.set(ctx.expense(&budget_id, &expense.id), to_document(expense)?);
        }
        ctx.store.commit(batch)?;
        info!(budget = %budget_id, daily, categories = budget.expenses.len(), "budget created");
        Ok(budget)
    }

    /// Loads the budget document and its categories ordered by `orderIndex`.
    pub fn load(ctx: &ServiceContext<'_>, budget_id: &str) -> ServiceResult<Budget> {
        let doc = ctx
            .store
            .get(&ctx.budget(budget_id))?
            .ok_or_else(|| BudgetError::not_found("budget", budget_id))?;
        let mut budget: Budget = from_document(doc)?;
        budget.id = budget_id.to_string();
        budget.expenses = query_as(
            ctx.store,
            &ctx.expenses(budget_id),
            &Query::new().order_by("orderIndex"),
        )?;
        debug!(budget = %budget_id, categories = budget.expenses.len(), "budget loaded");
        Ok(budget)
    }

    pub fn list_titles(ctx: &ServiceContext<'_>, archived: bool) -> ServiceResult<Vec<BudgetTitle>> {
        let query = Query::new()
            .filter("isArchived", FilterOp::Eq, archived)
            .order_by("dateStart")
            .order_by("title");
        let titles = ctx
            .store
            .query(&ctx.budgets(), &query)?
            .into_iter()
            .map(|(id, doc)| {
                let title = doc
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                BudgetTitle { id, title }
            })
            .collect();
        Ok(titles)
    }

    /// Writes the populated fields of `patch`.
    ///
    /// Total and date edits must keep the allowance non-negative given what the
    /// Daily bucket has already consumed; they then rebuild the Daily bucket.
    pub fn update(ctx: &ServiceContext<'_>, budget: &mut Budget, patch: &BudgetPatch) -> ServiceResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(BudgetError::InvalidOperation("budget title cannot be empty".into()));
            }
        }
        if let Some(total) = patch.total {
            check_amount(total)?;
        }
        if patch.affects_allowance() {
            let mut candidate = budget.clone();
            candidate.apply(patch);
            let range = candidate.range()?;
            ctx.calculator
                .is_total_valid(candidate.total, &range, &candidate.expenses)?;
        }

        ctx.store.update(&ctx.budget(&budget.id), to_document(patch)?)?;
        budget.apply(patch);
        debug!(budget = %budget.id, ?patch, "budget updated");

        if patch.affects_allowance() {
            Self::refresh_daily(ctx, budget)?;
        }
        Ok(())
    }

    pub fn archive(ctx: &ServiceContext<'_>, budget: &mut Budget) -> ServiceResult<()> {
        Self::update(ctx, budget, &BudgetPatch::archived(true))?;
        info!(budget = %budget.id, "budget archived");
        Ok(())
    }

    pub fn restore(ctx: &ServiceContext<'_>, budget: &mut Budget) -> ServiceResult<()> {
        Self::update(ctx, budget, &BudgetPatch::archived(false))?;
        info!(budget = %budget.id, "budget restored");
        Ok(())
    }

    /// Draft for a new budget seeded with this budget's categories.
    pub fn template(ctx: &ServiceContext<'_>, budget: &Budget) -> BudgetDraft {
        BudgetDraft::from_template(budget, ctx.calculator.daily_title())
    }

    /// Rebuilds the Daily bucket from the current total and categories, then
    /// stores the recomputed per-day allowance on the budget.
    pub fn refresh_daily(ctx: &ServiceContext<'_>, budget: &mut Budget) -> ServiceResult<Amount> {
        let update = ctx
            .calculator
            .recompute_daily_category(budget.total, &budget.expenses)?;
        ctx.store.update(
            &ctx.expense(&budget.id, &update.expense_id),
            fields([
                ("amount", Value::from(update.amount)),
                ("balance", Value::from(update.balance)),
            ]),
        )?;
        if let Some(daily) = budget.expense_mut(&update.expense_id) {
            daily.amount = update.amount;
            daily.balance = update.balance;
        }

        let range = budget.range()?;
        let allowance = ctx
            .calculator
            .compute_daily(budget.total, &range, &budget.expenses);
        ctx.store
            .update(&ctx.budget(&budget.id), fields([("daily", Value::from(allowance))]))?;
        budget.daily = allowance;
        debug!(budget = %budget.id, daily = allowance, "daily bucket refreshed");
        Ok(allowance)
    }
}
