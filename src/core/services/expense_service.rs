use serde_json::Value;
use tracing::{debug, info};

use crate::calc::check_amount;
use crate::domain::{expense::move_and_reindex, Amount, BalanceUpdate, Budget, Expense, ExpenseDraft};
use crate::errors::{BudgetError, ValidationError};
use crate::storage::{fields, to_document, FilterOp, Query, WriteBatch};

use super::{BudgetService, ServiceContext, ServiceResult};

pub struct ExpenseService;

impl ExpenseService {
    /// Appends a category after the existing ones; its amount is taken from
    /// the Daily bucket.
    pub fn add(ctx: &ServiceContext<'_>, budget: &mut Budget, draft: &ExpenseDraft) -> ServiceResult<Expense> {
        let title = Self::validate_title(ctx, budget, None, &draft.title)?;
        check_amount(draft.amount)?;
        if draft.amount < 0 {
            return Err(ValidationError::InvalidInput("amount cannot be negative".into()).into());
        }
        ctx.calculator.check_amount_change(budget, draft.amount, 0)?;

        let expense = Expense::new(ctx.store.new_id(), title, draft.amount, budget.next_order_index());
        ctx.store
            .set(&ctx.expense(&budget.id, &expense.id), to_document(&expense)?)?;
        budget.expenses.push(expense.clone());
        info!(budget = %budget.id, expense = %expense.id, amount = expense.amount, "category added");

        BudgetService::refresh_daily(ctx, budget)?;
        Ok(expense)
    }

    pub fn rename(ctx: &ServiceContext<'_>, budget: &mut Budget, expense_id: &str, title: &str) -> ServiceResult<()> {
        let current = Self::require(budget, expense_id)?;
        if current.is_daily(ctx.calculator.daily_title()) {
            return Err(BudgetError::InvalidOperation(
                "the Daily category cannot be renamed".into(),
            ));
        }
        let title = Self::validate_title(ctx, budget, Some(expense_id), title)?;
        ctx.store.update(
            &ctx.expense(&budget.id, expense_id),
            fields([("title", Value::from(title.clone()))]),
        )?;
        if let Some(expense) = budget.expense_mut(expense_id) {
            expense.title = title;
        }
        Ok(())
    }

    /// Changes a category's planned amount, keeping what it has already consumed.
    pub fn change_amount(
        ctx: &ServiceContext<'_>,
        budget: &mut Budget,
        expense_id: &str,
        new_amount: Amount,
    ) -> ServiceResult<()> {
        let current = Self::require(budget, expense_id)?;
        if current.is_daily(ctx.calculator.daily_title()) {
            return Err(BudgetError::InvalidOperation(
                "the Daily amount follows the budget total".into(),
            ));
        }
        check_amount(new_amount)?;
        if new_amount < 0 {
            return Err(ValidationError::InvalidInput("amount cannot be negative".into()).into());
        }
        let old_amount = current.amount;
        let new_balance = new_amount - current.consumed();
        if new_balance < 0 {
            return Err(ValidationError::BalanceNotEnough {
                balance: new_balance,
            }
            .into());
        }
        ctx.calculator
            .check_amount_change(budget, new_amount, old_amount)?;

        ctx.store.update(
            &ctx.expense(&budget.id, expense_id),
            fields([
                ("amount", Value::from(new_amount)),
                ("balance", Value::from(new_balance)),
            ]),
        )?;
        if let Some(expense) = budget.expense_mut(expense_id) {
            expense.amount = new_amount;
            expense.balance = new_balance;
        }
        debug!(budget = %budget.id, expense = %expense_id, old_amount, new_amount, "category amount changed");

        BudgetService::refresh_daily(ctx, budget)?;
        Ok(())
    }

    /// Removes a category with no linked spends; its amount returns to Daily.
    pub fn delete(ctx: &ServiceContext<'_>, budget: &mut Budget, expense_id: &str) -> ServiceResult<()> {
        let current = Self::require(budget, expense_id)?;
        if current.is_daily(ctx.calculator.daily_title()) {
            return Err(BudgetError::InvalidOperation(
                "the Daily category cannot be deleted".into(),
            ));
        }
        let linked = ctx.store.query(
            &ctx.spends(&budget.id),
            &Query::new().filter("categoryId", FilterOp::Eq, expense_id),
        )?;
        if !linked.is_empty() {
            return Err(BudgetError::InvalidOperation(
                "Category has linked spends".into(),
            ));
        }

        ctx.store.delete(&ctx.expense(&budget.id, expense_id))?;
        budget.expenses.retain(|expense| expense.id != expense_id);
        info!(budget = %budget.id, expense = %expense_id, "category deleted");

        BudgetService::refresh_daily(ctx, budget)?;
        Ok(())
    }

    /// Moves the category at `from` to `to` and rewrites every `orderIndex`.
    pub fn reorder(ctx: &ServiceContext<'_>, budget: &mut Budget, from: usize, to: usize) -> ServiceResult<()> {
        let len = budget.expenses.len();
        if from >= len || to >= len {
            return Err(ValidationError::InvalidInput(format!(
                "cannot move category {from} to {to} in a list of {len}"
            ))
            .into());
        }
        let mut reordered = budget.expenses.clone();
        move_and_reindex(&mut reordered, from, to);

        let mut batch = WriteBatch::new();
        for expense in &reordered {
            batch.update(
                ctx.expense(&budget.id, &expense.id),
                fields([("orderIndex", Value::from(expense.order_index))]),
            );
        }
        ctx.store.commit(batch)?;
        budget.expenses = reordered;
        Ok(())
    }

    /// Writes several category balances in one batch.
    pub fn apply_balance_updates(
        ctx: &ServiceContext<'_>,
        budget: &mut Budget,
        updates: &[BalanceUpdate<'_>],
    ) -> ServiceResult<()> {
        for update in updates {
            Self::require(budget, update.expense_id)?;
        }
        let mut batch = WriteBatch::new();
        for update in updates {
            batch.update(
                ctx.expense(&budget.id, update.expense_id),
                fields([("balance", Value::from(update.new_balance))]),
            );
        }
        ctx.store.commit(batch)?;
        for update in updates {
            if let Some(expense) = budget.expense_mut(update.expense_id) {
                expense.balance = update.new_balance;
            }
        }
        Ok(())
    }

    fn require<'b>(budget: &'b Budget, expense_id: &str) -> ServiceResult<&'b Expense> {
        budget
            .expense(expense_id)
            .ok_or_else(|| BudgetError::not_found("expense", expense_id))
    }

    fn validate_title(
        ctx: &ServiceContext<'_>,
        budget: &Budget,
        exclude: Option<&str>,
        candidate: &str,
    ) -> ServiceResult<String> {
        let title = candidate.trim();
        if title.is_empty() {
            return Err(ValidationError::InvalidInput("category title cannot be empty".into()).into());
        }
        if title == ctx.calculator.daily_title() {
            return Err(ValidationError::InvalidInput(format!("`{title}` is reserved")).into());
        }
        let normalized = title.to_lowercase();
        let duplicate = budget.expenses.iter().any(|expense| {
            expense.title.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| expense.id != id)
        });
        if duplicate {
            return Err(ValidationError::InvalidInput(format!(
                "Category `{title}` already exists"
            ))
            .into());
        }
        Ok(title.to_string())
    }
}
