//! Budget template service
//!
//! A template lists the categories that take part in a year's budget.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::period::validate_year;
use crate::models::{BudgetTemplate, Category, CategoryId, DateRange};
use crate::storage::{budget, categories, templates, transactions, Storage};

/// Service for budget templates
pub struct TemplateService<'a> {
    storage: &'a Storage,
}

/// Request body for adding a category to a template
#[derive(Debug, Clone, Deserialize)]
pub struct AddToTemplate {
    pub category_id: CategoryId,
}

/// Request body for copying a template
#[derive(Debug, Clone, Deserialize)]
pub struct CopyTemplate {
    pub from_year: i32,
    pub to_year: i32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CopyResult {
    pub copied: usize,
}

fn check_year(year: i32) -> MoneybagsResult<()> {
    validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))
}

impl<'a> TemplateService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Categories in the year's template
    pub async fn categories(&self, year: i32) -> MoneybagsResult<Vec<Category>> {
        check_year(year)?;
        let mut conn = self.storage.acquire().await?;
        templates::categories_for_year(&mut conn, year).await
    }

    /// Years that have a template
    pub async fn years(&self) -> MoneybagsResult<Vec<i32>> {
        let mut conn = self.storage.acquire().await?;
        templates::years(&mut conn).await
    }

    /// Add a category to a year's template
    pub async fn add(&self, year: i32, category_id: CategoryId) -> MoneybagsResult<BudgetTemplate> {
        check_year(year)?;
        let mut conn = self.storage.acquire().await?;

        let category = categories::get(&mut conn, category_id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(category_id.to_string()))?;

        if templates::exists(&mut conn, year, category_id).await? {
            return Err(MoneybagsError::Duplicate {
                entity_type: "Template category",
                identifier: format!("{} in {}", category.name, year),
            });
        }

        let template = BudgetTemplate::new(year, category_id);
        templates::insert(&mut conn, &template).await?;
        info!(year, category = %category.name, "added category to template");
        Ok(template)
    }

    /// Remove a category from a year's template
    ///
    /// Refused while the category has budget entries or transactions in that
    /// year.
    pub async fn remove(&self, year: i32, category_id: CategoryId) -> MoneybagsResult<()> {
        check_year(year)?;
        let mut conn = self.storage.acquire().await?;

        let category = categories::get(&mut conn, category_id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(category_id.to_string()))?;

        let entries = budget::count_for_category_year(&mut conn, category_id, year).await?;
        if entries > 0 {
            warn!(year, category = %category.name, entries, "refused template removal");
            return Err(MoneybagsError::InUse(format!(
                "Cannot remove '{}' from {} - it has {} budget entries",
                category.name, year, entries
            )));
        }

        let txns =
            transactions::count_for_category(&mut conn, category_id, DateRange::year(year)).await?;
        if txns > 0 {
            warn!(year, category = %category.name, transactions = txns, "refused template removal");
            return Err(MoneybagsError::InUse(format!(
                "Cannot remove '{}' from {} - it has {} transactions",
                category.name, year, txns
            )));
        }

        if !templates::delete(&mut conn, year, category_id).await? {
            return Err(MoneybagsError::NotFound {
                entity_type: "Template category",
                identifier: format!("{} in {}", category.name, year),
            });
        }

        info!(year, category = %category.name, "removed category from template");
        Ok(())
    }

    /// Copy one year's template into another, skipping categories already
    /// present. Returns how many were copied.
    pub async fn copy(&self, from_year: i32, to_year: i32) -> MoneybagsResult<usize> {
        check_year(from_year)?;
        check_year(to_year)?;
        if from_year == to_year {
            return Err(MoneybagsError::Validation(
                "Source and target year must differ".into(),
            ));
        }

        let mut tx = self.storage.begin().await?;
        let source = templates::categories_for_year(&mut tx, from_year).await?;

        let mut copied = 0;
        for category in &source {
            if templates::exists(&mut tx, to_year, category.id).await? {
                continue;
            }
            templates::insert(&mut tx, &BudgetTemplate::new(to_year, category.id)).await?;
            copied += 1;
        }
        tx.commit().await?;

        info!(from_year, to_year, copied, "copied template");
        Ok(copied)
    }
}
