use chrono::{SubsecRound, Utc};
use serde_json::Value;
use tracing::info;

use crate::calc::{check_amount, compare_balances, compute_diff, BalanceComparison};
use crate::domain::{Amount, Budget, Spend};
use crate::storage::{fields, to_document};

use super::{BudgetService, ServiceContext, ServiceResult};

pub const FIX_SPEND_TITLE: &str = "Balance fix";

pub struct ReconcileService;

impl ReconcileService {
    /// Compares the money the user actually holds with the tracked balances.
    pub fn compare(budget: &Budget, fact_balance: Amount) -> ServiceResult<BalanceComparison> {
        check_amount(fact_balance)?;
        Ok(compare_balances(fact_balance, &budget.expenses))
    }

    /// Posts a corrective Daily spend so that the tracked balances sum to
    /// `fact_balance`. Returns `None` when nothing needs fixing.
    pub fn apply_fix(ctx: &ServiceContext<'_>, budget: &mut Budget, fact_balance: Amount) -> ServiceResult<Option<Spend>> {
        check_amount(fact_balance)?;
        let diff = compute_diff(fact_balance, &budget.expenses);
        let plan = match ctx.calculator.plan_fix(budget, diff)? {
            Some(plan) => plan,
            None => return Ok(None),
        };

        let spend = Spend::new(
            ctx.store.new_id(),
            FIX_SPEND_TITLE,
            plan.amount,
            Some(plan.category_id.clone()),
            plan.date,
            Utc::now().trunc_subsecs(3),
        );
        ctx.store
            .set(&ctx.spend(&budget.id, &spend.id), to_document(&spend)?)?;
        ctx.store.update(
            &ctx.expense(&budget.id, &plan.category_id),
            fields([("balance", Value::from(plan.new_balance))]),
        )?;
        if let Some(daily) = budget.expense_mut(&plan.category_id) {
            daily.balance = plan.new_balance;
        }
        info!(budget = %budget.id, diff, amount = plan.amount, "balance fix posted");

        BudgetService::refresh_daily(ctx, budget)?;
        Ok(Some(spend))
    }
}
