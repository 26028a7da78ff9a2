//! Document layout:
//!
//! ```text
//! users/{uid}                                  { email, name }
//! users/{uid}/budgets/{bid}                    budget fields
//! users/{uid}/budgets/{bid}/expenses/{eid}     category
//! users/{uid}/budgets/{bid}/spend/{sid}        spend
//! ```

use super::{CollectionPath, DocPath};

pub const USERS: &str = "users";
pub const BUDGETS: &str = "budgets";
pub const EXPENSES: &str = "expenses";
pub const SPEND: &str = "spend";

pub fn user(uid: &str) -> DocPath {
    CollectionPath::root(USERS).doc(uid)
}

pub fn budgets(uid: &str) -> CollectionPath {
    user(uid).collection(BUDGETS)
}

pub fn budget(uid: &str, budget_id: &str) -> DocPath {
    budgets(uid).doc(budget_id)
}

pub fn expenses(uid: &str, budget_id: &str) -> CollectionPath {
    budget(uid, budget_id).collection(EXPENSES)
}

pub fn expense(uid: &str, budget_id: &str, expense_id: &str) -> DocPath {
    expenses(uid, budget_id).doc(expense_id)
}

pub fn spends(uid: &str, budget_id: &str) -> CollectionPath {
    budget(uid, budget_id).collection(SPEND)
}

pub fn spend(uid: &str, budget_id: &str, spend_id: &str) -> DocPath {
    spends(uid, budget_id).doc(spend_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_under_the_user_document() {
        assert_eq!(user("u").to_string(), "users/u");
        assert_eq!(expense("u", "b", "e").to_string(), "users/u/budgets/b/expenses/e");
        assert_eq!(spends("u", "b").to_string(), "users/u/budgets/b/spend");
        assert_eq!(spend("u", "b", "s").parent(), spends("u", "b"));
    }
}
