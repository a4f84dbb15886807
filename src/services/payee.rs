//! Payee service
//!
//! Provides business logic for payee management including creation,
//! updates, usage statistics and guarded deletion.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{Payee, PayeeId, PayeeType, PayeeUsage};
use crate::storage::{payees, Storage};

/// Service for payee management
pub struct PayeeService<'a> {
    storage: &'a Storage,
}

/// Request body for creating a payee
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayee {
    pub name: String,
    #[serde(rename = "type", default)]
    pub payee_type: PayeeType,
}

/// Request body for updating a payee
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePayee {
    pub name: String,
    #[serde(rename = "type", default)]
    pub payee_type: Option<PayeeType>,
}

impl<'a> PayeeService<'a> {
    /// Create a new payee service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new payee
    pub async fn create(&self, name: &str, payee_type: PayeeType) -> MoneybagsResult<Payee> {
        let name = name.trim();
        let payee = Payee::new(name, payee_type);
        payee
            .validate()
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = self.storage.acquire().await?;
        if payees::get_by_name(&mut conn, name).await?.is_some() {
            return Err(MoneybagsError::Duplicate {
                entity_type: "Payee",
                identifier: name.to_string(),
            });
        }

        payees::insert(&mut conn, &payee).await?;
        info!(payee_id = %payee.id, name = %payee.name, "created payee");
        Ok(payee)
    }

    /// Get a payee by ID
    pub async fn get(&self, id: PayeeId) -> MoneybagsResult<Option<Payee>> {
        let mut conn = self.storage.acquire().await?;
        payees::get(&mut conn, id).await
    }

    /// Find a payee by name or ID string
    pub async fn find(&self, identifier: &str) -> MoneybagsResult<Option<Payee>> {
        let mut conn = self.storage.acquire().await?;
        if let Some(payee) = payees::get_by_name(&mut conn, identifier).await? {
            return Ok(Some(payee));
        }
        if let Ok(id) = identifier.parse::<PayeeId>() {
            return payees::get(&mut conn, id).await;
        }
        Ok(None)
    }

    /// List all payees by name
    pub async fn list(&self) -> MoneybagsResult<Vec<Payee>> {
        let mut conn = self.storage.acquire().await?;
        payees::list(&mut conn).await
    }

    /// List all payees with transaction count and last use
    pub async fn list_with_usage(&self) -> MoneybagsResult<Vec<PayeeUsage>> {
        let mut conn = self.storage.acquire().await?;
        payees::list_with_usage(&mut conn).await
    }

    /// Rename a payee and optionally change its type
    pub async fn update(
        &self,
        id: PayeeId,
        name: &str,
        payee_type: Option<PayeeType>,
    ) -> MoneybagsResult<Payee> {
        let mut conn = self.storage.acquire().await?;
        let mut payee = payees::get(&mut conn, id)
            .await?
            .ok_or_else(|| MoneybagsError::payee_not_found(id.to_string()))?;

        let name = name.trim();
        if let Some(existing) = payees::get_by_name(&mut conn, name).await? {
            if existing.id != id {
                return Err(MoneybagsError::Duplicate {
                    entity_type: "Payee",
                    identifier: name.to_string(),
                });
            }
        }

        payee.name = name.to_string();
        if let Some(payee_type) = payee_type {
            payee.payee_type = payee_type;
        }
        payee
            .validate()
            .map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        payees::update(&mut conn, &payee).await?;
        info!(payee_id = %id, name = %payee.name, "updated payee");
        Ok(payee)
    }

    /// Delete a payee that no transaction refers to
    pub async fn delete(&self, id: PayeeId) -> MoneybagsResult<Payee> {
        let mut conn = self.storage.acquire().await?;
        let payee = payees::get(&mut conn, id)
            .await?
            .ok_or_else(|| MoneybagsError::payee_not_found(id.to_string()))?;

        let count = payees::transaction_count(&mut conn, id).await?;
        if count > 0 {
            warn!(payee_id = %id, transactions = count, "refused payee delete");
            return Err(MoneybagsError::InUse(format!(
                "Cannot delete payee '{}' - it is used in {} transactions",
                payee.name, count
            )));
        }

        payees::delete(&mut conn, id).await?;
        info!(payee_id = %id, name = %payee.name, "deleted payee");
        Ok(payee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, Category, CategoryType, Transaction};
    use crate::storage::{categories, transactions};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let storage = Storage::in_memory().await.unwrap();
        let service = PayeeService::new(&storage);

        let payee = service.create("Netflix", PayeeType::Actual).await.unwrap();
        assert_eq!(payee.payee_type, PayeeType::Actual);

        let err = service.create(" netflix ", PayeeType::Generic).await.unwrap_err();
        assert!(matches!(err, MoneybagsError::Duplicate { .. }));

        let err = service.create("", PayeeType::Generic).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_update_keeps_type_when_omitted() {
        let storage = Storage::in_memory().await.unwrap();
        let service = PayeeService::new(&storage);
        let payee = service.create("Power", PayeeType::Generic).await.unwrap();

        let updated = service.update(payee.id, "Power Company", None).await.unwrap();
        assert_eq!(updated.name, "Power Company");
        assert_eq!(updated.payee_type, PayeeType::Generic);

        let updated = service
            .update(payee.id, "Power Company", Some(PayeeType::Actual))
            .await
            .unwrap();
        assert_eq!(updated.payee_type, PayeeType::Actual);

        assert!(service.update(PayeeId::new(), "X", None).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_usage_and_guarded_delete() {
        let storage = Storage::in_memory().await.unwrap();
        let service = PayeeService::new(&storage);
        let shop = service.create("Shop", PayeeType::Actual).await.unwrap();
        let idle = service.create("Idle", PayeeType::Actual).await.unwrap();

        {
            let mut conn = storage.acquire().await.unwrap();
            let food = Category::new("Food", CategoryType::Expenses);
            categories::insert(&mut conn, &food).await.unwrap();
            for day in [3, 17] {
                let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
                transactions::insert(
                    &mut conn,
                    &Transaction::new(food.id, Some(shop.id), date, Amount::new(120), None),
                )
                .await
                .unwrap();
            }
        }

        let usage = service.list_with_usage().await.unwrap();
        let shop_usage = usage.iter().find(|u| u.payee.id == shop.id).unwrap();
        assert_eq!(shop_usage.transaction_count, 2);
        assert_eq!(shop_usage.last_used, NaiveDate::from_ymd_opt(2024, 5, 17));
        let idle_usage = usage.iter().find(|u| u.payee.id == idle.id).unwrap();
        assert_eq!(idle_usage.transaction_count, 0);
        assert!(idle_usage.last_used.is_none());

        let err = service.delete(shop.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete payee 'Shop' - it is used in 2 transactions");

        service.delete(idle.id).await.unwrap();
        assert!(service.get(idle.id).await.unwrap().is_none());
    }
}
