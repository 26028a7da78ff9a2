use uuid::Uuid;

/// Money held in whole currency units.
pub type Amount = i64;

/// Largest magnitude accepted for any user-entered amount. Keeps every sum
/// over a budget's categories and spends well inside `i64`.
pub const MAX_AMOUNT: Amount = 1_000_000_000_000;

/// Title of the overflow category that absorbs the uncategorised remainder.
pub const DEFAULT_DAILY_TITLE: &str = "Daily";

/// Identifies entities that expose a stable document identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides access to a human-friendly entity title.
pub trait NamedEntity {
    fn title(&self) -> &str;
}

/// Generates a fresh document identifier.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Floor division matching mathematical floor for negative numerators.
pub fn floor_div(numerator: Amount, denominator: i64) -> Amount {
    numerator.div_euclid(denominator)
}
