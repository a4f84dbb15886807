//! Budget entry and budget template models
//!
//! A budget entry is the planned amount for one category in one month.
//! The template for a year lists the categories that can be budgeted in it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetEntryId, CategoryId, TemplateId};
use super::money::{Amount, MAX_AMOUNT_UNITS};
use super::period::{validate_month, validate_year, PeriodError};

/// Planned amount for a category in a specific month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: BudgetEntryId,
    pub category_id: CategoryId,
    pub year: i32,
    pub month: u32,
    pub amount: Amount,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetEntry {
    pub fn new(
        category_id: CategoryId,
        year: i32,
        month: u32,
        amount: Amount,
        comment: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetEntryId::new(),
            category_id,
            year,
            month,
            amount,
            comment: normalize_comment(comment),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        validate_year(self.year)?;
        validate_month(self.month)?;
        if self.amount.is_negative() {
            return Err(BudgetValidationError::NegativeAmount(self.amount));
        }
        if !self.amount.is_within_limit() {
            return Err(BudgetValidationError::TooLarge(self.amount));
        }
        Ok(())
    }
}

/// Blank comments are stored as NULL
pub fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Membership of a category in a year's budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTemplate {
    pub id: TemplateId,
    pub year: i32,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
}

impl BudgetTemplate {
    pub fn new(year: i32, category_id: CategoryId) -> Self {
        Self {
            id: TemplateId::new(),
            year,
            category_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    Period(PeriodError),
    NegativeAmount(Amount),
    TooLarge(Amount),
}

impl From<PeriodError> for BudgetValidationError {
    fn from(err: PeriodError) -> Self {
        Self::Period(err)
    }
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Period(e) => write!(f, "{}", e),
            Self::NegativeAmount(a) => {
                write!(f, "Budget amount cannot be negative (got {})", a)
            }
            Self::TooLarge(a) => write!(
                f,
                "Budget amount {} exceeds the limit of {}",
                a.units(),
                MAX_AMOUNT_UNITS
            ),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
