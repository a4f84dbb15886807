//! JSON Export functionality
//!
//! Exports the complete database to JSON format with schema versioning.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{
    BudgetEntry, BudgetTemplate, Category, ConfigEntry, Payee, SupersaverCategory, SupersaverEntry,
    Transaction,
};
use crate::storage::{
    budget, categories, configuration, payees, supersaver, templates, transactions, Storage,
};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub categories: Vec<Category>,
    pub payees: Vec<Payee>,
    pub templates: Vec<BudgetTemplate>,
    pub budget_entries: Vec<BudgetEntry>,
    pub transactions: Vec<Transaction>,
    pub configuration: Vec<ConfigEntry>,
    #[serde(default)]
    pub supersaver_categories: Vec<SupersaverCategory>,
    #[serde(default)]
    pub supersaver_entries: Vec<SupersaverEntry>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub category_count: usize,
    pub payee_count: usize,
    pub budget_entry_count: usize,
    pub transaction_count: usize,

    /// Date range of transactions (earliest)
    pub earliest_transaction: Option<NaiveDate>,

    /// Date range of transactions (latest)
    pub latest_transaction: Option<NaiveDate>,
}

impl FullExport {
    /// Read every table into an export
    pub async fn from_storage(storage: &Storage) -> MoneybagsResult<Self> {
        let mut conn = storage.acquire().await?;
        let categories = categories::list(&mut conn).await?;
        let payees = payees::list(&mut conn).await?;
        let templates = templates::list_all(&mut conn).await?;
        let budget_entries = budget::list_all(&mut conn).await?;
        let transactions = transactions::list_all(&mut conn).await?;
        let configuration = configuration::list(&mut conn).await?;
        let supersaver_categories = supersaver::list_categories(&mut conn).await?;
        let supersaver_entries = supersaver::list_all_entries(&mut conn).await?;

        let metadata = ExportMetadata {
            category_count: categories.len(),
            payee_count: payees.len(),
            budget_entry_count: budget_entries.len(),
            transaction_count: transactions.len(),
            earliest_transaction: transactions.iter().map(|t| t.date).min(),
            latest_transaction: transactions.iter().map(|t| t.date).max(),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            categories,
            payees,
            templates,
            budget_entries,
            transactions,
            configuration,
            supersaver_categories,
            supersaver_entries,
            metadata,
        })
    }
}

/// Export the full database to JSON
pub async fn export_full_json<W: Write>(
    storage: &Storage,
    writer: &mut W,
    pretty: bool,
) -> MoneybagsResult<()> {
    let export = FullExport::from_storage(storage).await?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| MoneybagsError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, CategoryType};

    #[tokio::test]
    async fn test_full_export_contents() {
        let storage = Storage::in_memory().await.unwrap();
        let food = Category::new("Food", CategoryType::Expenses);
        {
            let mut conn = storage.acquire().await.unwrap();
            categories::insert(&mut conn, &food).await.unwrap();
            templates::insert(&mut conn, &BudgetTemplate::new(2024, food.id)).await.unwrap();
            budget::upsert(&mut conn, &BudgetEntry::new(food.id, 2024, 1, Amount::new(4000), None))
                .await
                .unwrap();
            for day in [3, 17] {
                let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
                transactions::insert(&mut conn, &Transaction::new(food.id, None, date, Amount::new(100), None))
                    .await
                    .unwrap();
            }
            configuration::set(&mut conn, "currency_format", "eur").await.unwrap();

            let holiday = SupersaverCategory::new("Holiday");
            supersaver::insert_category(&mut conn, &holiday).await.unwrap();
            let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
            supersaver::insert_entry(&mut conn, &SupersaverEntry::new(holiday.id, date, Amount::new(300), None))
                .await
                .unwrap();
        }

        let mut buffer = Vec::new();
        export_full_json(&storage, &mut buffer, true).await.unwrap();
        let export: FullExport = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.categories.len(), 1);
        assert_eq!(export.templates.len(), 1);
        assert_eq!(export.budget_entries[0].amount, Amount::new(4000));
        assert_eq!(export.metadata.transaction_count, 2);
        assert_eq!(
            export.metadata.earliest_transaction,
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
        assert_eq!(export.configuration[0].value, "eur");
        assert_eq!(export.supersaver_categories[0].name, "Holiday");
        assert_eq!(export.supersaver_entries[0].amount, Amount::new(300));
    }

    #[tokio::test]
    async fn test_empty_database_export() {
        let storage = Storage::in_memory().await.unwrap();
        let export = FullExport::from_storage(&storage).await.unwrap();
        assert!(export.transactions.is_empty());
        assert!(export.metadata.latest_transaction.is_none());
    }
}
