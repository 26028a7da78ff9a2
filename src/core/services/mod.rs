pub mod budget_service;
pub mod expense_service;
pub mod reconcile_service;
pub mod spend_service;

pub use budget_service::BudgetService;
pub use expense_service::ExpenseService;
pub use reconcile_service::ReconcileService;
pub use spend_service::SpendService;

use crate::calc::BudgetCalculator;
use crate::errors::BudgetError;
use crate::storage::{paths, CollectionPath, DocPath, DocumentStore};

pub type ServiceResult<T> = Result<T, BudgetError>;

/// Collaborators shared by every service call made on behalf of one user.
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub store: &'a dyn DocumentStore,
    pub calculator: &'a BudgetCalculator,
    pub user_id: &'a str,
}

impl<'a> ServiceContext<'a> {
    pub fn new(store: &'a dyn DocumentStore, calculator: &'a BudgetCalculator, user_id: &'a str) -> Self {
        Self {
            store,
            calculator,
            user_id,
        }
    }

    pub(crate) fn budgets(&self) -> CollectionPath {
        paths::budgets(self.user_id)
    }

    pub(crate) fn budget(&self, budget_id: &str) -> DocPath {
        paths::budget(self.user_id, budget_id)
    }

    pub(crate) fn expenses(&self, budget_id: &str) -> CollectionPath {
        paths::expenses(self.user_id, budget_id)
    }

    pub(crate) fn expense(&self, budget_id: &str, expense_id: &str) -> DocPath {
        paths::expense(self.user_id, budget_id, expense_id)
    }

    pub(crate) fn spends(&self, budget_id: &str) -> CollectionPath {
        paths::spends(self.user_id, budget_id)
    }

    pub(crate) fn spend(&self, budget_id: &str, spend_id: &str) -> DocPath {
        paths::spend(self.user_id, budget_id, spend_id)
    }
}
