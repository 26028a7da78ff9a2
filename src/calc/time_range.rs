use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Number of calendar days spanned by `[start, end]`, both endpoints included.
pub fn days_between_inclusive(start: NaiveDate, end: NaiveDate) -> Result<i64, ValidationError> {
    if end < start {
        return Err(ValidationError::InvalidDateRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// Validated inclusive budget period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length of the period in days; always at least 1.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Days left from `date` through the end of the period, counting `date` itself.
    pub fn days_remaining_from(&self, date: NaiveDate) -> Result<i64, ValidationError> {
        if !self.contains(date) {
            return Err(ValidationError::DateOutOfScope { date });
        }
        days_between_inclusive(date, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn single_day_counts_as_one() {
        assert_eq!(days_between_inclusive(day(5), day(5)).unwrap(), 1);
    }

    #[test]
    fn counts_both_endpoints() {
        assert_eq!(days_between_inclusive(day(1), day(10)).unwrap(), 10);
        // 2024 is a leap year
        assert_eq!(days_between_inclusive(day(1), day(29)).unwrap(), 29);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = days_between_inclusive(day(10), day(1)).unwrap_err();
        assert_eq!(err.code(), "date_range_error");
        assert!(DateRange::new(day(10), day(1)).is_err());
    }

    #[test]
    fn remaining_days_include_the_given_day() {
        let range = DateRange::new(day(1), day(10)).unwrap();
        assert_eq!(range.days(), 10);
        assert_eq!(range.days_remaining_from(day(1)).unwrap(), 10);
        assert_eq!(range.days_remaining_from(day(10)).unwrap(), 1);
        assert!(matches!(
            range.days_remaining_from(day(11)),
            Err(ValidationError::DateOutOfScope { .. })
        ));
    }
}
