//! Budget service
//!
//! Provides business logic for monthly budget entries and the data behind
//! the yearly budget grid.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::period::validate_year;
use crate::models::{
    Amount, BudgetEntry, BudgetEntryId, Category, CategoryId, DateRange, TransactionWithPayee,
};
use crate::storage::{budget, categories, templates, transactions, Storage};

/// Service for budget entries
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Request body for saving a budget entry
#[derive(Debug, Clone, Deserialize)]
pub struct SaveBudgetEntry {
    pub category_id: CategoryId,
    pub year: i32,
    pub month: u32,
    pub amount: Amount,
    #[serde(default)]
    pub comment: Option<String>,
}

/// One cell of the budget grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetCell {
    pub id: BudgetEntryId,
    pub amount: Amount,
    pub comment: Option<String>,
}

/// Everything the budget grid for a year shows
#[derive(Debug, Clone, Serialize)]
pub struct BudgetYearData {
    pub year: i32,
    /// Template categories, income first
    pub categories: Vec<Category>,
    /// Category → month → entry
    pub budget_entries: BTreeMap<CategoryId, BTreeMap<u32, BudgetCell>>,
    /// Category → month → transactions
    pub transactions: BTreeMap<CategoryId, BTreeMap<u32, Vec<TransactionWithPayee>>>,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create or update the entry for a category and month
    pub async fn save_entry(&self, request: SaveBudgetEntry) -> MoneybagsResult<BudgetEntry> {
        let entry = BudgetEntry::new(
            request.category_id,
            request.year,
            request.month,
            request.amount,
            request.comment,
        );
        entry
            .validate()
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = self.storage.acquire().await?;

        let category = categories::get(&mut conn, entry.category_id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(entry.category_id.to_string()))?;

        if !templates::exists(&mut conn, entry.year, entry.category_id).await? {
            return Err(MoneybagsError::Validation(format!(
                "Category '{}' is not in the {} budget template",
                category.name, entry.year
            )));
        }

        let saved = budget::upsert(&mut conn, &entry).await?;
        info!(
            category = %category.name,
            year = saved.year,
            month = saved.month,
            amount = saved.amount.units(),
            "saved budget entry"
        );
        Ok(saved)
    }

    /// Delete a budget entry
    pub async fn delete_entry(&self, id: BudgetEntryId) -> MoneybagsResult<()> {
        let mut conn = self.storage.acquire().await?;
        if !budget::delete(&mut conn, id).await? {
            return Err(MoneybagsError::budget_entry_not_found(id.to_string()));
        }
        info!(entry_id = %id, "deleted budget entry");
        Ok(())
    }

    /// The entry for a category and month, if any
    pub async fn get_entry(
        &self,
        category_id: CategoryId,
        year: i32,
        month: u32,
    ) -> MoneybagsResult<Option<BudgetEntry>> {
        let mut conn = self.storage.acquire().await?;
        budget::find(&mut conn, category_id, year, month).await
    }

    /// Categories, entries and transactions of a year, grouped for the grid
    pub async fn year_data(&self, year: i32) -> MoneybagsResult<BudgetYearData> {
        validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = self.storage.acquire().await?;
        let categories = templates::categories_for_year(&mut conn, year).await?;
        let entries = budget::list_for_year(&mut conn, year).await?;
        let txns = transactions::list_in_range(&mut conn, DateRange::year(year)).await?;

        debug!(
            year,
            categories = categories.len(),
            entries = entries.len(),
            transactions = txns.len(),
            "loaded budget year"
        );

        let mut budget_entries: BTreeMap<CategoryId, BTreeMap<u32, BudgetCell>> = BTreeMap::new();
        for entry in entries {
            budget_entries.entry(entry.category_id).or_default().insert(
                entry.month,
                BudgetCell {
                    id: entry.id,
                    amount: entry.amount,
                    comment: entry.comment,
                },
            );
        }

        let mut by_category: BTreeMap<CategoryId, BTreeMap<u32, Vec<TransactionWithPayee>>> =
            BTreeMap::new();
        for txn in txns {
            let month = txn.transaction.date.month();
            by_category
                .entry(txn.transaction.category_id)
                .or_default()
                .entry(month)
                .or_default()
                .push(txn);
        }

        Ok(BudgetYearData {
            year,
            categories,
            budget_entries,
            transactions: by_category,
        })
    }
}
