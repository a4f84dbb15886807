//! Year Overview Report
//!
//! For every category in a year's template: twelve monthly budget/actual
//! cells, yearly totals, and totals per category type plus the net result.

use std::collections::HashMap;

use serde::Serialize;

use super::aggregate::{actual_total, yearly_budget_total, VarianceFigures};
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::period::validate_year;
use crate::models::{
    Amount, BudgetEntry, Category, CategoryId, CategoryType, DateRange, Transaction, YearMonth,
};
use crate::storage::{budget, templates, transactions, Storage};

/// One category's line in the overview
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOverviewRow {
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_type: CategoryType,
    /// Index 0 is January
    pub months: Vec<VarianceFigures>,
    pub total: VarianceFigures,
}

/// Year Overview Report
#[derive(Debug, Clone, Serialize)]
pub struct YearOverviewReport {
    pub year: i32,
    pub income: Vec<CategoryOverviewRow>,
    pub expenses: Vec<CategoryOverviewRow>,
    pub income_total: VarianceFigures,
    pub expense_total: VarianceFigures,
    /// Income minus expenses as planned
    pub net_budget: Amount,
    /// Income minus expenses as recorded
    pub net_actual: Amount,
}

impl YearOverviewReport {
    /// Generate the overview for a year
    pub async fn generate(storage: &Storage, year: i32) -> MoneybagsResult<Self> {
        validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = storage.acquire().await?;
        let categories = templates::categories_for_year(&mut conn, year).await?;
        let entries = budget::list_for_year(&mut conn, year).await?;
        let transactions: Vec<Transaction> =
            transactions::list_in_range(&mut conn, DateRange::year(year))
                .await?
                .into_iter()
                .map(|t| t.transaction)
                .collect();

        Ok(Self::build(year, &categories, &entries, &transactions))
    }

    /// Assemble the report from already-loaded rows
    pub fn build(
        year: i32,
        categories: &[Category],
        entries: &[BudgetEntry],
        transactions: &[Transaction],
    ) -> Self {
        let mut entries_by_category: HashMap<CategoryId, Vec<&BudgetEntry>> = HashMap::new();
        for entry in entries.iter().filter(|e| e.year == year) {
            entries_by_category.entry(entry.category_id).or_default().push(entry);
        }

        let mut txns_by_category: HashMap<CategoryId, Vec<&Transaction>> = HashMap::new();
        for txn in transactions {
            txns_by_category.entry(txn.category_id).or_default().push(txn);
        }

        let mut income = Vec::new();
        let mut expenses = Vec::new();

        for category in categories {
            let cat_entries = entries_by_category
                .get(&category.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let cat_txns = txns_by_category
                .get(&category.id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let months = (1..=12)
                .map(|month| {
                    let budget = yearly_budget_total(
                        cat_entries.iter().copied().filter(|e| e.month == month),
                    );
                    let range = YearMonth { year, month }.range();
                    let actual = actual_total(cat_txns.iter().copied(), range);
                    VarianceFigures::compute(category.category_type, budget, actual)
                })
                .collect();

            let total = VarianceFigures::compute(
                category.category_type,
                yearly_budget_total(cat_entries.iter().copied()),
                actual_total(cat_txns.iter().copied(), DateRange::year(year)),
            );

            let row = CategoryOverviewRow {
                category_id: category.id,
                category_name: category.name.clone(),
                category_type: category.category_type,
                months,
                total,
            };

            match category.category_type {
                CategoryType::Income => income.push(row),
                CategoryType::Expenses => expenses.push(row),
            }
        }

        let income_total = sum_rows(CategoryType::Income, &income);
        let expense_total = sum_rows(CategoryType::Expenses, &expenses);

        Self {
            year,
            net_budget: income_total.budget - expense_total.budget,
            net_actual: income_total.actual - expense_total.actual,
            income,
            expenses,
            income_total,
            expense_total,
        }
    }
}

fn sum_rows(category_type: CategoryType, rows: &[CategoryOverviewRow]) -> VarianceFigures {
    let budget = rows.iter().map(|r| r.total.budget).sum();
    let actual = rows.iter().map(|r| r.total.actual).sum();
    VarianceFigures::compute(category_type, budget, actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetTemplate;
    use crate::storage::categories;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_build_totals() {
        let salary = Category::new("Salary", CategoryType::Income);
        let rent = Category::new("Rent", CategoryType::Expenses);

        let entries = vec![
            BudgetEntry::new(salary.id, 2024, 1, Amount::new(40000), None),
            BudgetEntry::new(salary.id, 2024, 2, Amount::new(40000), None),
            BudgetEntry::new(rent.id, 2024, 1, Amount::new(12000), None),
            BudgetEntry::new(rent.id, 2023, 1, Amount::new(99999), None),
        ];
        let transactions = vec![
            Transaction::new(salary.id, None, date(1, 25), Amount::new(41000), None),
            Transaction::new(rent.id, None, date(1, 1), Amount::new(12000), None),
            Transaction::new(rent.id, None, date(2, 1), Amount::new(12500), None),
        ];

        let report = YearOverviewReport::build(
            2024,
            &[salary.clone(), rent.clone()],
            &entries,
            &transactions,
        );

        assert_eq!(report.income.len(), 1);
        assert_eq!(report.expenses.len(), 1);

        let rent_row = &report.expenses[0];
        assert_eq!(rent_row.months.len(), 12);
        assert_eq!(rent_row.total.budget, Amount::new(12000));
        assert_eq!(rent_row.total.actual, Amount::new(24500));
        assert_eq!(rent_row.total.variance, Amount::new(-12500));
        assert_eq!(rent_row.months[1].budget, Amount::zero());
        assert_eq!(rent_row.months[1].percentage, 0.0);

        assert_eq!(report.income_total.budget, Amount::new(80000));
        assert_eq!(report.income_total.actual, Amount::new(41000));
        assert_eq!(report.net_budget, Amount::new(68000));
        assert_eq!(report.net_actual, Amount::new(16500));
    }

    #[tokio::test]
    async fn test_generate_reads_template_categories() {
        let storage = Storage::in_memory().await.unwrap();
        {
            let mut conn = storage.acquire().await.unwrap();
            let travel = Category::new("Travel", CategoryType::Expenses);
            let unused = Category::new("Unused", CategoryType::Expenses);
            categories::insert(&mut conn, &travel).await.unwrap();
            categories::insert(&mut conn, &unused).await.unwrap();
            templates::insert(&mut conn, &BudgetTemplate::new(2024, travel.id)).await.unwrap();
            budget::upsert(&mut conn, &BudgetEntry::new(travel.id, 2024, 7, Amount::new(5000), None))
                .await
                .unwrap();
        }

        let report = YearOverviewReport::generate(&storage, 2024).await.unwrap();
        assert_eq!(report.expenses.len(), 1);
        assert_eq!(report.expenses[0].category_name, "Travel");
        assert_eq!(report.expense_total.budget, Amount::new(5000));

        assert!(YearOverviewReport::generate(&storage, 3000).await.is_err());
    }
}
