//! Calendar helpers for budget years and months
//!
//! Budgets are planned per calendar month. Date ranges are half-open:
//! `[start, end)`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Validate a budget year
pub fn validate_year(year: i32) -> Result<(), PeriodError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(PeriodError::InvalidYear(year))
    }
}

/// Validate a month number
pub fn validate_month(month: u32) -> Result<(), PeriodError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(PeriodError::InvalidMonth(month))
    }
}

/// A calendar month of a specific year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        validate_year(year)?;
        validate_month(month)?;
        Ok(Self { year, month })
    }

    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Half-open range covering this month
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.next().first_day(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The full calendar year
    pub fn year(year: i32) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Short English month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month name for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    InvalidYear(i32),
    InvalidMonth(u32),
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidYear(y) => {
                write!(f, "Invalid year {} (must be {}-{})", y, MIN_YEAR, MAX_YEAR)
            }
            Self::InvalidMonth(m) => write!(f, "Invalid month {} (must be 1-12)", m),
        }
    }
}

impl std::error::Error for PeriodError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_validation() {
        assert!(validate_year(1900).is_ok());
        assert!(validate_year(2100).is_ok());
        assert_eq!(validate_year(1899), Err(PeriodError::InvalidYear(1899)));
        assert!(validate_year(2101).is_err());
    }

    #[test]
    fn test_month_range_is_half_open() {
        let march = YearMonth::new(2024, 3).unwrap();
        let range = march.range();
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 4, 1));
        assert!(range.contains(date(2024, 3, 31)));
        assert!(!range.contains(date(2024, 4, 1)));
    }

    #[test]
    fn test_december_rolls_over() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), YearMonth { year: 2025, month: 1 });
        assert_eq!(dec.range().end, date(2025, 1, 1));
        assert_eq!(
            YearMonth::new(2025, 1).unwrap().prev(),
            YearMonth { year: 2024, month: 12 }
        );
    }

    #[test]
    fn test_year_range() {
        let range = DateRange::year(2024);
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2025, 1, 1)));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
        assert_eq!(month_name(13), "?");
        assert_eq!(YearMonth::new(2024, 5).unwrap().to_string(), "2024-05");
    }
}
