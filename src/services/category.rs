//! Category service
//!
//! Provides business logic for income and expense categories: creation,
//! renaming, guarded deletion and listings with usage information.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{Category, CategoryId, CategoryType};
use crate::storage::{categories, templates, Storage};

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// Request body for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// Request body for renaming a category
#[derive(Debug, Clone, Deserialize)]
pub struct RenameCategory {
    pub name: String,
}

/// A category as shown in the category list
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListItem {
    #[serde(flatten)]
    pub category: Category,
    /// Years whose template includes the category
    pub years_used: Vec<i32>,
    /// Whether any budget entry or transaction refers to the category
    pub has_data: bool,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new category
    pub async fn create(&self, name: &str, category_type: CategoryType) -> MoneybagsResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MoneybagsError::Validation(
                "Category name cannot be empty".into(),
            ));
        }

        let category = Category::new(name, category_type);
        category
            .validate()
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = self.storage.acquire().await?;

        // Check for duplicate name
        if categories::get_by_name(&mut conn, name).await?.is_some() {
            return Err(MoneybagsError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        categories::insert(&mut conn, &category).await?;
        info!(category_id = %category.id, name = %category.name, "created category");

        Ok(category)
    }

    /// Get a category by ID
    pub async fn get(&self, id: CategoryId) -> MoneybagsResult<Option<Category>> {
        let mut conn = self.storage.acquire().await?;
        categories::get(&mut conn, id).await
    }

    /// Get a category by ID, failing if it does not exist
    pub async fn require(&self, id: CategoryId) -> MoneybagsResult<Category> {
        self.get(id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(id.to_string()))
    }

    /// Find a category by name or ID string
    pub async fn find(&self, identifier: &str) -> MoneybagsResult<Option<Category>> {
        let mut conn = self.storage.acquire().await?;

        // Try by name first
        if let Some(category) = categories::get_by_name(&mut conn, identifier.trim()).await? {
            return Ok(Some(category));
        }

        // Try parsing as ID
        if let Ok(id) = identifier.parse::<CategoryId>() {
            return categories::get(&mut conn, id).await;
        }

        Ok(None)
    }

    /// List all categories, income first
    pub async fn list(&self) -> MoneybagsResult<Vec<Category>> {
        let mut conn = self.storage.acquire().await?;
        categories::list(&mut conn).await
    }

    /// List all categories with the years they are used in
    pub async fn list_with_usage(&self) -> MoneybagsResult<Vec<CategoryListItem>> {
        let mut conn = self.storage.acquire().await?;
        let all = categories::list(&mut conn).await?;

        let mut items = Vec::with_capacity(all.len());
        for category in all {
            let years_used = templates::years_for_category(&mut conn, category.id).await?;
            let usage = categories::usage(&mut conn, category.id).await?;
            items.push(CategoryListItem {
                category,
                years_used,
                has_data: usage.has_data(),
            });
        }
        Ok(items)
    }

    /// Rename a category
    pub async fn rename(&self, id: CategoryId, name: &str) -> MoneybagsResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MoneybagsError::Validation(
                "Category name cannot be empty".into(),
            ));
        }

        let mut conn = self.storage.acquire().await?;
        let mut category = categories::get(&mut conn, id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(id.to_string()))?;

        // Check for duplicate
        if let Some(existing) = categories::get_by_name(&mut conn, name).await? {
            if existing.id != id {
                return Err(MoneybagsError::Duplicate {
                    entity_type: "Category",
                    identifier: name.to_string(),
                });
            }
        }

        let old_name = std::mem::replace(&mut category.name, name.to_string());
        category
            .validate()
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        categories::rename(&mut conn, id, &category.name).await?;
        info!(category_id = %id, from = %old_name, to = %category.name, "renamed category");

        Ok(category)
    }

    /// Delete a category
    ///
    /// Refused while transactions or budget entries refer to it. Template
    /// memberships are removed together with the category.
    pub async fn delete(&self, id: CategoryId) -> MoneybagsResult<Category> {
        let mut tx = self.storage.begin().await?;

        let category = categories::get(&mut tx, id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(id.to_string()))?;

        let usage = categories::usage(&mut tx, id).await?;
        if usage.transaction_count > 0 {
            warn!(category_id = %id, transactions = usage.transaction_count, "refused category delete");
            return Err(MoneybagsError::InUse(format!(
                "Cannot delete category '{}' - it has transactions",
                category.name
            )));
        }
        if usage.budget_entry_count > 0 {
            warn!(category_id = %id, entries = usage.budget_entry_count, "refused category delete");
            return Err(MoneybagsError::InUse(format!(
                "Cannot delete category '{}' - it has budget entries",
                category.name
            )));
        }

        templates::delete_for_category(&mut tx, id).await?;
        categories::delete(&mut tx, id).await?;
        tx.commit().await?;

        info!(category_id = %id, name = %category.name, "deleted category");
        Ok(category)
    }
}
