use chrono::{NaiveDate, SubsecRound, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::calc::{check_amount, check_balance_change};
use crate::domain::{Amount, BalanceUpdate, Budget, Spend, SpendDraft};
use crate::errors::{BudgetError, ValidationError};
use crate::storage::{fields, query_as, to_document, FilterOp, Query};

use super::{BudgetService, ExpenseService, ServiceContext, ServiceResult};

pub struct SpendService;

impl SpendService {
    /// Spends logged on `date`, oldest first.
    pub fn list_by_date(ctx: &ServiceContext<'_>, budget_id: &str, date: NaiveDate) -> ServiceResult<Vec<Spend>> {
        let query = Query::new()
            .filter("date", FilterOp::Eq, date.to_string())
            .order_by("date")
            .order_by("createdAt");
        Ok(query_as(ctx.store, &ctx.spends(budget_id), &query)?)
    }

    /// Spends dated within `start..=end`, ordered by date then creation time.
    pub fn list_in_range(
        ctx: &ServiceContext<'_>,
        budget_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<Spend>> {
        let query = Query::new()
            .filter("date", FilterOp::Ge, start.to_string())
            .filter("date", FilterOp::Le, end.to_string())
            .order_by("date")
            .order_by("createdAt");
        Ok(query_as(ctx.store, &ctx.spends(budget_id), &query)?)
    }

    /// Sum of Daily-bucket spends dated strictly before `date`.
    pub fn prior_daily_spend(ctx: &ServiceContext<'_>, budget: &Budget, date: NaiveDate) -> ServiceResult<Amount> {
        let daily = ctx.calculator.require_daily(&budget.expenses)?;
        let query = Query::new()
            .filter("categoryId", FilterOp::Eq, daily.id.as_str())
            .filter("date", FilterOp::Lt, date.to_string());
        let spends: Vec<Spend> = query_as(ctx.store, &ctx.spends(&budget.id), &query)?;
        Ok(spends.iter().map(|spend| spend.amount).sum())
    }

    /// Logs a spend on `date`, charging the Daily bucket when no category is given.
    ///
    /// The spend document is written before the category balance; a failure in
    /// the second step leaves the spend in place.
    pub fn add(
        ctx: &ServiceContext<'_>,
        budget: &mut Budget,
        date: NaiveDate,
        draft: &SpendDraft,
    ) -> ServiceResult<Spend> {
        check_amount(draft.amount)?;
        let range = budget.range()?;
        if !range.contains(date) {
            return Err(ValidationError::DateOutOfScope { date }.into());
        }
        let category = match &draft.category_id {
            Some(id) => budget
                .expense(id)
                .ok_or_else(|| BudgetError::not_found("expense", id.as_str()))?,
            None => ctx.calculator.require_daily(&budget.expenses)?,
        };
        let category_id = category.id.clone();
        let new_balance = check_balance_change(category.balance, 0, draft.amount)?;

        let spend = Spend::new(
            ctx.store.new_id(),
            draft.title.trim(),
            draft.amount,
            Some(category_id.clone()),
            date,
            Utc::now().trunc_subsecs(3),
        );
        ctx.store
            .set(&ctx.spend(&budget.id, &spend.id), to_document(&spend)?)?;
        info!(budget = %budget.id, spend = %spend.id, amount = spend.amount, %date, "spend added");

        if spend.amount != 0 {
            Self::write_balance(ctx, budget, &category_id, new_balance)?;
            BudgetService::refresh_daily(ctx, budget)?;
        }
        Ok(spend)
    }

    pub fn rename(ctx: &ServiceContext<'_>, budget_id: &str, spend: &mut Spend, title: &str) -> ServiceResult<()> {
        let title = title.trim().to_string();
        ctx.store.update(
            &ctx.spend(budget_id, &spend.id),
            fields([("title", Value::from(title.clone()))]),
        )?;
        spend.title = title;
        Ok(())
    }

    /// Updates the spend amount, then its category balance, then the Daily bucket.
    pub fn change_amount(
        ctx: &ServiceContext<'_>,
        budget: &mut Budget,
        spend: &mut Spend,
        new_amount: Amount,
    ) -> ServiceResult<()> {
        let old_amount = spend.amount;
        if old_amount == new_amount {
            return Ok(());
        }
        check_amount(new_amount)?;
        let category = match &spend.category_id {
            Some(id) => {
                let expense = budget
                    .expense(id)
                    .ok_or_else(|| BudgetError::not_found("expense", id.as_str()))?;
                Some((
                    expense.id.clone(),
                    check_balance_change(expense.balance, old_amount, new_amount)?,
                ))
            }
            None => None,
        };

        ctx.store.update(
            &ctx.spend(&budget.id, &spend.id),
            fields([("amount", Value::from(new_amount))]),
        )?;
        spend.amount = new_amount;
        debug!(spend = %spend.id, old_amount, new_amount, "spend amount changed");

        if let Some((category_id, new_balance)) = category {
            Self::write_balance(ctx, budget, &category_id, new_balance)?;
        }
        BudgetService::refresh_daily(ctx, budget)?;
        Ok(())
    }

    /// Moves a spend to another category.
    ///
    /// Both balances are written as one batch before the spend's reference is
    /// updated. A missing destination is reported without changing anything.
    pub fn reassign(
        ctx: &ServiceContext<'_>,
        budget: &mut Budget,
        spend: &mut Spend,
        destination_id: &str,
    ) -> ServiceResult<()> {
        if spend.belongs_to(destination_id) {
            return Ok(());
        }
        let destination = budget
            .expense(destination_id)
            .ok_or_else(|| BudgetError::not_found("expense", destination_id))?;
        let destination_balance = check_balance_change(destination.balance, 0, spend.amount)?;

        let source = match &spend.category_id {
            Some(id) => {
                let expense = budget
                    .expense(id)
                    .ok_or_else(|| BudgetError::not_found("expense", id.as_str()))?;
                Some((
                    expense.id.clone(),
                    check_balance_change(expense.balance, spend.amount, 0)?,
                ))
            }
            None => None,
        };

        let mut updates = vec![BalanceUpdate {
            expense_id: destination_id,
            new_balance: destination_balance,
        }];
        if let Some((source_id, source_balance)) = &source {
            updates.push(BalanceUpdate {
                expense_id: source_id,
                new_balance: *source_balance,
            });
        }
        ExpenseService::apply_balance_updates(ctx, budget, &updates)?;

        ctx.store.update(
            &ctx.spend(&budget.id, &spend.id),
            fields([("categoryId", Value::from(destination_id))]),
        )?;
        spend.category_id = Some(destination_id.to_string());
        info!(spend = %spend.id, to = %destination_id, "spend reassigned");

        BudgetService::refresh_daily(ctx, budget)?;
        Ok(())
    }

    /// Deletes the spend document, then gives its amount back to the category.
    ///
    /// Removing a negative spend takes money out of its category, so it is
    /// refused when that balance would drop below zero.
    pub fn delete(ctx: &ServiceContext<'_>, budget: &mut Budget, spend: &Spend) -> ServiceResult<()> {
        let restored = match &spend.category_id {
            Some(category_id) => match budget.expense(category_id) {
                Some(expense) => Some((
                    category_id.clone(),
                    check_balance_change(expense.balance, spend.amount, 0)?,
                )),
                None => {
                    warn!(spend = %spend.id, category = %category_id, "spend referenced a missing category");
                    None
                }
            },
            None => None,
        };

        ctx.store.delete(&ctx.spend(&budget.id, &spend.id))?;
        info!(budget = %budget.id, spend = %spend.id, "spend deleted");

        if let Some((category_id, balance)) = restored {
            Self::write_balance(ctx, budget, &category_id, balance)?;
        }
        BudgetService::refresh_daily(ctx, budget)?;
        Ok(())
    }

    fn write_balance(
        ctx: &ServiceContext<'_>,
        budget: &mut Budget,
        expense_id: &str,
        new_balance: Amount,
    ) -> ServiceResult<()> {
        ctx.store.update(
            &ctx.expense(&budget.id, expense_id),
            fields([("balance", Value::from(new_balance))]),
        )?;
        if let Some(expense) = budget.expense_mut(expense_id) {
            expense.balance = new_balance;
        }
        Ok(())
    }
}
