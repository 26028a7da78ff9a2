use super::{BudgetCalculator, DateRange};
use crate::domain::{floor_div, Amount, Budget, BudgetDraft, Expense, MAX_AMOUNT};
use crate::errors::ValidationError;

impl BudgetCalculator {
    /// Whether changing one category's planned amount from `old_amount` to
    /// `new_amount` keeps the daily allowance non-negative.
    pub fn is_amount_change_valid(&self, budget: &Budget, new_amount: Amount, old_amount: Amount) -> bool {
        self.check_amount_change(budget, new_amount, old_amount)
            .is_ok()
    }

    /// Validates a category amount change and returns the resulting allowance.
    ///
    /// The amount already consumed from the Daily bucket is subtracted before the
    /// per-day rate is computed; an allowance of exactly zero is accepted.
    pub fn check_amount_change(
        &self,
        budget: &Budget,
        new_amount: Amount,
        old_amount: Amount,
    ) -> Result<Amount, ValidationError> {
        let range = budget.range()?;
        let daily = self.require_daily(&budget.expenses)?;
        let left = budget.total - self.sum_categorized(&budget.expenses) + old_amount
            - new_amount
            - daily.consumed();
        non_negative(floor_div(left, range.days()))
    }

    /// Validates a budget total or date edit against the current categories,
    /// using the same Daily-consumption offset as [`Self::check_amount_change`].
    pub fn is_total_valid(
        &self,
        total: Amount,
        range: &DateRange,
        expenses: &[Expense],
    ) -> Result<Amount, ValidationError> {
        let daily = self.require_daily(expenses)?;
        let left = total - self.sum_categorized(expenses) - daily.consumed();
        non_negative(floor_div(left, range.days()))
    }

    /// Validates a creation draft and returns the initial daily allowance.
    pub fn check_creation(&self, draft: &BudgetDraft) -> Result<Amount, ValidationError> {
        let range = DateRange::new(draft.date_start, draft.date_end)?;
        check_amount(draft.total)?;
        if draft.total <= 0 {
            return Err(ValidationError::InvalidInput(
                "budget total must be positive".into(),
            ));
        }
        if draft.expenses.is_empty() {
            return Err(ValidationError::NoExpenses);
        }
        for expense in &draft.expenses {
            check_amount(expense.amount)?;
        }
        if let Some(bad) = draft
            .expenses
            .iter()
            .find(|expense| expense.amount < 1 || expense.title.trim().is_empty())
        {
            return Err(ValidationError::InvalidInput(format!(
                "expense `{}` needs a title and a positive amount",
                bad.title
            )));
        }
        if draft
            .expenses
            .iter()
            .any(|expense| expense.title == self.daily_title)
        {
            return Err(ValidationError::InvalidInput(format!(
                "`{}` is reserved for the uncategorised remainder",
                self.daily_title
            )));
        }
        let allowance = floor_div(draft.total - draft.categorised_total(), range.days());
        if allowance < 1 {
            return Err(ValidationError::DailyTooLow { allowance });
        }
        Ok(allowance)
    }
}

/// Rejects amounts whose magnitude exceeds [`MAX_AMOUNT`].
pub fn check_amount(amount: Amount) -> Result<Amount, ValidationError> {
    if amount.unsigned_abs() > MAX_AMOUNT.unsigned_abs() {
        return Err(ValidationError::InvalidInput(format!(
            "amount {amount} exceeds the supported range"
        )));
    }
    Ok(amount)
}

/// Validates a spend amount change against its category balance and returns
/// the balance the category would end with.
pub fn check_balance_change(
    balance: Amount,
    old_amount: Amount,
    new_amount: Amount,
) -> Result<Amount, ValidationError> {
    let next = balance + old_amount - new_amount;
    if next < 0 {
        return Err(ValidationError::BalanceNotEnough { balance: next });
    }
    Ok(next)
}

fn non_negative(allowance: Amount) -> Result<Amount, ValidationError> {
    if allowance < 0 {
        Err(ValidationError::DailyNegative { allowance })
    } else {
        Ok(allowance)
    }
}
