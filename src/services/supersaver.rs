//! Supersaver service
//!
//! Savings categories with guarded deletion, deposits, balances and the
//! yearly heatmap and dashboard figures.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{
    Amount, DateRange, SupersaverCategory, SupersaverCategoryId, SupersaverCategorySummary,
    SupersaverEntry, SupersaverEntryDetail, SupersaverEntryId, SupersaverHeatmap,
    SupersaverSummary, SupersaverTrend, YearMonth,
};
use crate::models::budget::normalize_comment;
use crate::models::period::validate_year;
use crate::services::transaction::checked_date;
use crate::storage::{supersaver, Storage};

/// Service for savings categories and deposits
pub struct SupersaverService<'a> {
    storage: &'a Storage,
}

/// Request body for creating or renaming a savings category
#[derive(Debug, Clone, Deserialize)]
pub struct SupersaverCategoryName {
    pub name: String,
}

/// Request body for creating or updating a deposit
#[derive(Debug, Clone, Deserialize)]
pub struct SaveSupersaverEntry {
    pub category_id: SupersaverCategoryId,
    /// `YYYY-MM-DD`
    pub date: String,
    pub amount: Amount,
    #[serde(default)]
    pub comment: Option<String>,
}

fn duplicate(name: &str) -> MoneybagsError {
    MoneybagsError::Duplicate {
        entity_type: "Supersaver category",
        identifier: name.to_string(),
    }
}

fn checked_deposit(amount: Amount) -> MoneybagsResult<Amount> {
    if amount.is_negative() {
        return Err(MoneybagsError::Validation(
            "Amount must be a non-negative integer".into(),
        ));
    }
    amount
        .checked_limit()
        .map_err(|e| MoneybagsError::Validation(e.to_string()))
}

impl<'a> SupersaverService<'a> {
    /// Create a new supersaver service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a savings category with a unique name
    pub async fn create_category(&self, name: &str) -> MoneybagsResult<SupersaverCategory> {
        let category = SupersaverCategory::new(name);
        category
            .validate()
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = self.storage.acquire().await?;
        if supersaver::get_category_by_name(&mut conn, &category.name)
            .await?
            .is_some()
        {
            return Err(duplicate(&category.name));
        }

        supersaver::insert_category(&mut conn, &category).await?;
        info!(category_id = %category.id, name = %category.name, "created supersaver category");
        Ok(category)
    }

    /// All savings categories with deposit count and balance
    pub async fn list_categories(&self) -> MoneybagsResult<Vec<SupersaverCategorySummary>> {
        let mut conn = self.storage.acquire().await?;
        supersaver::list_categories_with_balance(&mut conn).await
    }

    /// Rename a savings category
    pub async fn rename_category(
        &self,
        id: SupersaverCategoryId,
        name: &str,
    ) -> MoneybagsResult<SupersaverCategory> {
        let mut conn = self.storage.acquire().await?;
        let mut category = supersaver::get_category(&mut conn, id)
            .await?
            .ok_or_else(|| MoneybagsError::supersaver_category_not_found(id.to_string()))?;

        let name = name.trim();
        if let Some(existing) = supersaver::get_category_by_name(&mut conn, name).await? {
            if existing.id != id {
                return Err(duplicate(name));
            }
        }

        category.name = name.to_string();
        category
            .validate()
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?;
        category.updated_at = chrono::Utc::now();

        supersaver::update_category(&mut conn, &category).await?;
        info!(category_id = %id, name = %category.name, "renamed supersaver category");
        Ok(category)
    }

    /// Delete a savings category that has no deposits
    pub async fn delete_category(&self, id: SupersaverCategoryId) -> MoneybagsResult<SupersaverCategory> {
        let mut conn = self.storage.acquire().await?;
        let category = supersaver::get_category(&mut conn, id)
            .await?
            .ok_or_else(|| MoneybagsError::supersaver_category_not_found(id.to_string()))?;

        let count = supersaver::entry_count(&mut conn, id).await?;
        if count > 0 {
            warn!(category_id = %id, entries = count, "refused supersaver category delete");
            return Err(MoneybagsError::InUse(format!(
                "Cannot delete category '{}' - it has {} supersaver entries",
                category.name, count
            )));
        }

        supersaver::delete_category(&mut conn, id).await?;
        info!(category_id = %id, name = %category.name, "deleted supersaver category");
        Ok(category)
    }

    /// Record a deposit
    pub async fn create_entry(&self, request: SaveSupersaverEntry) -> MoneybagsResult<SupersaverEntryDetail> {
        let amount = checked_deposit(request.amount)?;
        let date = checked_date(&request.date)?;

        let mut conn = self.storage.acquire().await?;
        let category = supersaver::get_category(&mut conn, request.category_id)
            .await?
            .ok_or_else(|| {
                MoneybagsError::supersaver_category_not_found(request.category_id.to_string())
            })?;

        let entry = SupersaverEntry::new(category.id, date, amount, request.comment);
        supersaver::insert_entry(&mut conn, &entry).await?;
        info!(
            entry_id = %entry.id,
            category = %category.name,
            amount = amount.units(),
            "created supersaver entry"
        );
        Ok(SupersaverEntryDetail {
            entry,
            category_name: category.name,
        })
    }

    /// Change category, date, amount and comment of a deposit
    pub async fn update_entry(
        &self,
        id: SupersaverEntryId,
        request: SaveSupersaverEntry,
    ) -> MoneybagsResult<SupersaverEntryDetail> {
        let mut conn = self.storage.acquire().await?;
        let mut entry = supersaver::get_entry(&mut conn, id)
            .await?
            .ok_or_else(|| MoneybagsError::supersaver_entry_not_found(id.to_string()))?;

        let category = supersaver::get_category(&mut conn, request.category_id)
            .await?
            .ok_or_else(|| {
                MoneybagsError::supersaver_category_not_found(request.category_id.to_string())
            })?;

        entry.amount = checked_deposit(request.amount)?;
        entry.date = checked_date(&request.date)?;
        entry.category_id = category.id;
        entry.comment = normalize_comment(request.comment);
        entry.updated_at = chrono::Utc::now();

        supersaver::update_entry(&mut conn, &entry).await?;
        info!(entry_id = %id, "updated supersaver entry");
        Ok(SupersaverEntryDetail {
            entry,
            category_name: category.name,
        })
    }

    /// Delete a deposit
    pub async fn delete_entry(&self, id: SupersaverEntryId) -> MoneybagsResult<()> {
        let mut conn = self.storage.acquire().await?;
        if !supersaver::delete_entry(&mut conn, id).await? {
            return Err(MoneybagsError::supersaver_entry_not_found(id.to_string()));
        }
        info!(entry_id = %id, "deleted supersaver entry");
        Ok(())
    }

    /// Deposits of a category in one month, newest first
    pub async fn entries_for_month(
        &self,
        category_id: SupersaverCategoryId,
        year: i32,
        month: u32,
    ) -> MoneybagsResult<Vec<SupersaverEntryDetail>> {
        let range = YearMonth::new(year, month)
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?
            .range();

        let mut conn = self.storage.acquire().await?;
        if supersaver::get_category(&mut conn, category_id).await?.is_none() {
            return Err(MoneybagsError::supersaver_category_not_found(category_id.to_string()));
        }
        let entries = supersaver::list_entries_for_category(&mut conn, category_id, range).await?;
        debug!(category_id = %category_id, year, month, count = entries.len(), "listed supersaver entries");
        Ok(entries)
    }

    /// Current balance of a category
    pub async fn balance(&self, category_id: SupersaverCategoryId) -> MoneybagsResult<Amount> {
        let mut conn = self.storage.acquire().await?;
        if supersaver::get_category(&mut conn, category_id).await?.is_none() {
            return Err(MoneybagsError::supersaver_category_not_found(category_id.to_string()));
        }
        supersaver::balance(&mut conn, category_id).await
    }

    /// Deposits of all categories per day of a year
    pub async fn heatmap(&self, year: i32) -> MoneybagsResult<SupersaverHeatmap> {
        validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))?;
        let mut conn = self.storage.acquire().await?;
        let days = supersaver::daily_totals(&mut conn, DateRange::year(year)).await?;
        Ok(SupersaverHeatmap::from_days(year, days))
    }

    /// Saved this month and this year as of `today`, with the trend against
    /// last month
    pub async fn dashboard_summary(&self, today: NaiveDate) -> MoneybagsResult<SupersaverSummary> {
        let current = YearMonth::of(today);
        let mut conn = self.storage.acquire().await?;

        let saved_this_month = supersaver::total_in_range(&mut conn, current.range()).await?;
        let saved_last_month = supersaver::total_in_range(&mut conn, current.prev().range()).await?;
        let saved_this_year =
            supersaver::total_in_range(&mut conn, DateRange::year(current.year)).await?;

        Ok(SupersaverSummary {
            saved_this_month,
            saved_this_year,
            month_trend: SupersaverTrend::compare(saved_this_month, saved_last_month),
        })
    }
}
