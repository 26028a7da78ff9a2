pub mod budget;
pub mod common;
pub mod expense;
pub mod spend;
pub mod user;

pub use budget::{Budget, BudgetDraft, BudgetPatch, BudgetTitle};
pub use common::{floor_div, new_id, Amount, MAX_AMOUNT, Identifiable, NamedEntity, DEFAULT_DAILY_TITLE};
pub use expense::{BalanceUpdate, Expense, ExpenseDraft};
pub use spend::{Spend, SpendDraft};
pub use user::{UserData, UserProfile};
