//! Error taxonomy shared by the calculator, persistence, auth and service layers.
//!
//! Every error exposes a short `code()` which the state container records as a
//! user-facing notice key.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Amount;

/// A proposed change was rejected before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("date range ends on {end} before it starts on {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("daily allowance would become negative ({allowance})")]
    DailyNegative { allowance: Amount },
    #[error("daily allowance must be at least 1 (got {allowance})")]
    DailyTooLow { allowance: Amount },
    #[error("category balance would become negative ({balance})")]
    BalanceNotEnough { balance: Amount },
    #[error("budget needs at least one categorised expense")]
    NoExpenses,
    #[error("date {date} is outside the budget range")]
    DateOutOfScope { date: NaiveDate },
    #[error("budget has no `{0}` category")]
    MissingDailyCategory(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidDateRange { .. } => "date_range_error",
            ValidationError::DailyNegative { .. } => "daily_negative_error",
            ValidationError::DailyTooLow { .. } => "daily_error",
            ValidationError::BalanceNotEnough { .. } => "balance_not_enough_error",
            ValidationError::NoExpenses => "add_expenses",
            ValidationError::DateOutOfScope { .. } => "date_scope_error",
            ValidationError::MissingDailyCategory(_) => "daily_category_missing",
            ValidationError::InvalidInput(_) => "invalid_input",
        }
    }
}

/// Failures raised by a [`crate::storage::DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document `{0}` not found")]
    NotFound(String),
    #[error("invalid path `{0}`")]
    InvalidPath(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store unavailable ({code})")]
    Unavailable { code: String },
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn code(&self) -> &str {
        match self {
            StoreError::NotFound(_) => "not-found",
            StoreError::InvalidPath(_) | StoreError::InvalidDocument(_) => "invalid-argument",
            StoreError::Io(_) => "io",
            StoreError::Serde(_) => "data-loss",
            StoreError::Unavailable { code } => code,
            StoreError::Poisoned => "internal",
        }
    }
}

/// Failures raised by an [`crate::auth::AuthProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("email `{0}` is already registered")]
    EmailInUse(String),
    #[error("invalid email `{0}`")]
    InvalidEmail(String),
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("auth backend failure: {0}")]
    Backend(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::EmailInUse(_) => "auth/email-already-in-use",
            AuthError::InvalidEmail(_) => "auth/invalid-email",
            AuthError::WeakPassword { .. } => "auth/weak-password",
            AuthError::InvalidCredentials => "auth/invalid-credential",
            AuthError::NotSignedIn => "auth/no-current-user",
            AuthError::Backend(_) => "auth/internal-error",
        }
    }
}

/// Failures raised while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Unified error type for the service and state layers.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("No user signed in")]
    NoUser,
    #[error("No budget loaded")]
    NoBudget,
}

impl BudgetError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        BudgetError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn code(&self) -> String {
        match self {
            BudgetError::Validation(err) => err.code().to_string(),
            BudgetError::Store(err) => err.code().to_string(),
            BudgetError::Auth(err) => err.code().to_string(),
            BudgetError::NotFound { .. } | BudgetError::InvalidOperation(_) => {
                "some_error".to_string()
            }
            BudgetError::NoUser => "no_user".to_string(),
            BudgetError::NoBudget => "budget_load_error".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, BudgetError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, BudgetError>;
