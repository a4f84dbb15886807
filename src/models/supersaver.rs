//! Supersaver models
//!
//! Supersaver tracks savings deposits outside the budget. Deposits are kept
//! per savings category, and a category's balance is the sum of its
//! deposits.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::budget::normalize_comment;
use super::category::{validate_category_name, CategoryValidationError};
use super::ids::{SupersaverCategoryId, SupersaverEntryId};
use super::money::Amount;

/// A savings goal or account that deposits are made into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupersaverCategory {
    pub id: SupersaverCategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupersaverCategory {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SupersaverCategoryId::new(),
            name: name.into().trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_category_name(&self.name)
    }
}

/// A category with its number of deposits and current balance
#[derive(Debug, Clone, Serialize)]
pub struct SupersaverCategorySummary {
    #[serde(flatten)]
    pub category: SupersaverCategory,
    pub entry_count: i64,
    pub balance: Amount,
}

/// One savings deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupersaverEntry {
    pub id: SupersaverEntryId,
    pub category_id: SupersaverCategoryId,
    pub date: NaiveDate,
    pub amount: Amount,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupersaverEntry {
    pub fn new(
        category_id: SupersaverCategoryId,
        date: NaiveDate,
        amount: Amount,
        comment: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SupersaverEntryId::new(),
            category_id,
            date,
            amount,
            comment: normalize_comment(comment),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A deposit together with its category name
#[derive(Debug, Clone, Serialize)]
pub struct SupersaverEntryDetail {
    #[serde(flatten)]
    pub entry: SupersaverEntry,
    pub category_name: String,
}

/// Deposits of all categories per day of one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupersaverHeatmap {
    pub year: i32,
    /// Only days with deposits are present
    pub days: BTreeMap<NaiveDate, Amount>,
    pub total_saved: Amount,
}

impl SupersaverHeatmap {
    pub fn from_days(year: i32, days: BTreeMap<NaiveDate, Amount>) -> Self {
        let total_saved = days.values().copied().sum();
        Self {
            year,
            days,
            total_saved,
        }
    }
}

/// Direction of this month's deposits compared with last month's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupersaverTrend {
    Up,
    Down,
    Same,
}

impl SupersaverTrend {
    pub fn compare(current: Amount, previous: Amount) -> Self {
        match current.cmp(&previous) {
            std::cmp::Ordering::Greater => Self::Up,
            std::cmp::Ordering::Less => Self::Down,
            std::cmp::Ordering::Equal => Self::Same,
        }
    }
}

/// Dashboard widget figures across all savings categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupersaverSummary {
    pub saved_this_month: Amount,
    pub saved_this_year: Amount,
    pub month_trend: SupersaverTrend,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_category_name_rules() {
        let category = SupersaverCategory::new("  Holiday  ");
        assert_eq!(category.name, "Holiday");
        assert!(category.validate().is_ok());

        let blank = SupersaverCategory::new("   ");
        assert_eq!(blank.validate(), Err(CategoryValidationError::EmptyName));
    }

    #[test]
    fn test_entry_blank_comment_is_none() {
        let entry = SupersaverEntry::new(
            SupersaverCategoryId::new(),
            date(2024, 5, 1),
            Amount::new(500),
            Some("  ".into()),
        );
        assert!(entry.comment.is_none());
    }

    #[test]
    fn test_heatmap_total() {
        let days = BTreeMap::from([
            (date(2024, 1, 15), Amount::new(50_000)),
            (date(2024, 1, 16), Amount::new(125_000)),
        ]);
        let heatmap = SupersaverHeatmap::from_days(2024, days);
        assert_eq!(heatmap.total_saved, Amount::new(175_000));

        let json = serde_json::to_value(&heatmap).unwrap();
        assert_eq!(json["days"]["2024-01-15"], 50_000);
        assert_eq!(json["total_saved"], 175_000);
    }

    #[test]
    fn test_trend() {
        assert_eq!(
            SupersaverTrend::compare(Amount::new(10), Amount::new(5)),
            SupersaverTrend::Up
        );
        assert_eq!(
            SupersaverTrend::compare(Amount::new(0), Amount::new(5)),
            SupersaverTrend::Down
        );
        assert_eq!(
            SupersaverTrend::compare(Amount::zero(), Amount::zero()),
            SupersaverTrend::Same
        );
        assert_eq!(serde_json::to_value(SupersaverTrend::Same).unwrap(), "same");
    }
}
