//! Monthly variance for a single category

use serde::Serialize;

use super::aggregate::{actual_total, yearly_budget_total, VarianceFigures};
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{CategoryId, CategoryType, Transaction, YearMonth};
use crate::storage::{budget, categories, transactions, Storage};

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyVarianceReport {
    pub year: i32,
    pub month: u32,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_type: CategoryType,
    #[serde(flatten)]
    pub figures: VarianceFigures,
}

impl MonthlyVarianceReport {
    pub async fn generate(
        storage: &Storage,
        year: i32,
        month: u32,
        category_id: CategoryId,
    ) -> MoneybagsResult<Self> {
        let period =
            YearMonth::new(year, month).map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = storage.acquire().await?;
        let category = categories::get(&mut conn, category_id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(category_id.to_string()))?;

        let entry = budget::find(&mut conn, category_id, year, month).await?;
        let txns: Vec<Transaction> =
            transactions::list_for_category(&mut conn, category_id, period.range())
                .await?
                .into_iter()
                .map(|t| t.transaction)
                .collect();

        let figures = VarianceFigures::compute(
            category.category_type,
            yearly_budget_total(entry.iter()),
            actual_total(&txns, period.range()),
        );

        Ok(Self {
            year,
            month,
            category_id,
            category_name: category.name,
            category_type: category.category_type,
            figures,
        })
    }
}
