//! Spreadsheet import service
//!
//! Import runs in three steps: parse the uploaded sheet, validate a mapping
//! from sheet category names to existing categories, then execute the import
//! as a single database transaction.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::import::{parse_sheet, ParsedSheet, SheetGrid};
use crate::models::{
    BudgetEntry, BudgetTemplate, CategoryId, Payee, PayeeId, PayeeType, Transaction, YearMonth,
};
use crate::storage::{budget, categories, payees, templates, transactions, Storage};

/// Payee that imported transactions are recorded against
pub const IMPORT_PAYEE_NAME: &str = "Import - Spreadsheet";

/// Sheet category name → category id
pub type CategoryMapping = BTreeMap<String, CategoryId>;

/// Number of rows an import would write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub budget_count: usize,
    pub transaction_count: usize,
}

/// Outcome of checking a mapping against the database
#[derive(Debug, Clone, Serialize)]
pub struct ImportValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: ImportCounts,
}

/// What an executed import wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub budget_count: usize,
    pub transaction_count: usize,
    pub template_count: usize,
}

/// Service for spreadsheet imports
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    /// Create a new import service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Read an uploaded sheet and suggest categories with matching names
    pub async fn parse(&self, bytes: &[u8], year: i32) -> MoneybagsResult<ParsedSheet> {
        let grid = SheetGrid::from_bytes(bytes)?;
        let mut parsed = parse_sheet(&grid, year)?;

        let mut conn = self.storage.acquire().await?;
        for sheet_category in &parsed.sheet_categories {
            if let Some(category) = categories::get_by_name(&mut conn, &sheet_category.name).await? {
                parsed
                    .suggested_mapping
                    .insert(sheet_category.name.clone(), category.id);
            }
        }

        debug!(
            categories = parsed.sheet_categories.len(),
            suggested = parsed.suggested_mapping.len(),
            "suggested import mapping"
        );
        Ok(parsed)
    }

    /// Check that every sheet category maps to an existing category of the
    /// same type, and warn about budget entries that would be overwritten
    pub async fn validate(
        &self,
        parsed: &ParsedSheet,
        mapping: &CategoryMapping,
    ) -> MoneybagsResult<ImportValidation> {
        let mut conn = self.storage.acquire().await?;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut summary = ImportCounts::default();

        for sheet_category in &parsed.sheet_categories {
            let name = &sheet_category.name;
            let Some(&category_id) = mapping.get(name) else {
                errors.push(format!("Category '{}' not mapped", name));
                continue;
            };

            let Some(category) = categories::get(&mut conn, category_id).await? else {
                errors.push(format!(
                    "Category '{}' mapped to '{}' which does not exist",
                    name, category_id
                ));
                continue;
            };

            if category.category_type != sheet_category.category_type {
                errors.push(format!(
                    "Category '{}' is {} in the sheet but '{}' is {}",
                    name, sheet_category.category_type, category.name, category.category_type
                ));
                continue;
            }

            for &month in sheet_category.budget.keys() {
                if budget::find(&mut conn, category_id, parsed.year, month)
                    .await?
                    .is_some()
                {
                    warnings.push(format!(
                        "Budget entry for '{}' {}-{:02} already exists - will overwrite",
                        category.name, parsed.year, month
                    ));
                }
            }

            summary.budget_count += sheet_category.budget.len();
            summary.transaction_count += sheet_category.transaction_count();
        }

        Ok(ImportValidation {
            valid: errors.is_empty(),
            errors,
            warnings,
            summary,
        })
    }

    /// Validate, then write everything in one transaction
    pub async fn execute(
        &self,
        parsed: &ParsedSheet,
        mapping: &CategoryMapping,
    ) -> MoneybagsResult<ImportSummary> {
        let validation = self.validate(parsed, mapping).await?;
        if !validation.valid {
            warn!(errors = validation.errors.len(), "refused invalid import");
            return Err(MoneybagsError::Validation(validation.errors.join("; ")));
        }

        let mut tx = self.storage.begin().await?;
        // Dropping the transaction on error rolls the batch back
        let summary = apply_import(&mut tx, parsed, mapping).await?;
        tx.commit().await?;

        info!(
            year = parsed.year,
            budget_entries = summary.budget_count,
            transactions = summary.transaction_count,
            templates = summary.template_count,
            "import completed"
        );
        Ok(summary)
    }
}

/// Write a parsed sheet through `conn` without committing
pub async fn apply_import(
    conn: &mut SqliteConnection,
    parsed: &ParsedSheet,
    mapping: &CategoryMapping,
) -> MoneybagsResult<ImportSummary> {
    let payee_id = ensure_import_payee(conn).await?;
    let mut summary = ImportSummary::default();

    let mapped: BTreeSet<CategoryId> = parsed
        .sheet_categories
        .iter()
        .filter_map(|c| mapping.get(&c.name).copied())
        .collect();
    for &category_id in &mapped {
        if !templates::exists(conn, parsed.year, category_id).await? {
            templates::insert(conn, &BudgetTemplate::new(parsed.year, category_id)).await?;
            summary.template_count += 1;
        }
    }

    for sheet_category in &parsed.sheet_categories {
        let category_id = mapping.get(&sheet_category.name).copied().ok_or_else(|| {
            MoneybagsError::Import(format!("Category '{}' not mapped", sheet_category.name))
        })?;

        for (&month, &amount) in &sheet_category.budget {
            let entry = BudgetEntry::new(category_id, parsed.year, month, amount, None);
            budget::upsert(conn, &entry).await?;
            summary.budget_count += 1;
        }

        for (&month, amounts) in &sheet_category.actuals {
            let date = YearMonth::new(parsed.year, month)
                .map_err(|e| MoneybagsError::Import(e.to_string()))?
                .first_day();
            for &amount in amounts {
                let txn = Transaction::new(category_id, Some(payee_id), date, amount, None);
                transactions::insert(conn, &txn).await?;
                summary.transaction_count += 1;
            }
        }
    }

    Ok(summary)
}

async fn ensure_import_payee(conn: &mut SqliteConnection) -> MoneybagsResult<PayeeId> {
    if let Some(payee) = payees::get_by_name(conn, IMPORT_PAYEE_NAME).await? {
        return Ok(payee.id);
    }
    let payee = Payee::new(IMPORT_PAYEE_NAME, PayeeType::Generic);
    payees::insert(conn, &payee).await?;
    debug!(payee_id = %payee.id, "created import payee");
    Ok(payee.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{SheetCategory, SheetLayout};
    use crate::models::{Amount, Category, CategoryType, DateRange};

    async fn setup() -> (Storage, Category, Category) {
        let storage = Storage::in_memory().await.unwrap();
        let food = Category::new("Mat", CategoryType::Expenses);
        let salary = Category::new("Lønn", CategoryType::Income);
        {
            let mut conn = storage.acquire().await.unwrap();
            categories::insert(&mut conn, &food).await.unwrap();
            categories::insert(&mut conn, &salary).await.unwrap();
        }
        (storage, food, salary)
    }

    fn sheet_category(name: &str, category_type: CategoryType) -> SheetCategory {
        let mut budget = BTreeMap::new();
        budget.insert(1, Amount::new(4000));
        budget.insert(2, Amount::new(4000));
        let mut actuals = BTreeMap::new();
        actuals.insert(1, vec![Amount::new(575), Amount::new(2182)]);
        SheetCategory {
            name: name.to_string(),
            category_type,
            budget,
            actuals,
        }
    }

    fn parsed(categories: Vec<SheetCategory>) -> ParsedSheet {
        ParsedSheet {
            year: 2024,
            layout: SheetLayout::Labelled,
            sheet_categories: categories,
            warnings: Vec::new(),
            suggested_mapping: BTreeMap::new(),
        }
    }

    async fn row_counts(storage: &Storage, category_id: CategoryId) -> (i64, i64) {
        let mut conn = storage.acquire().await.unwrap();
        let entries = budget::count_for_category_year(&mut conn, category_id, 2024).await.unwrap();
        let txns = transactions::count_for_category(&mut conn, category_id, DateRange::year(2024))
            .await
            .unwrap();
        (entries, txns)
    }

    #[tokio::test]
    async fn test_parse_suggests_matching_names() {
        let (storage, food, _) = setup().await;
        let sheet = "\
,,Utgifter
,,MAT,Budsjett,,100
,,,Resultat,,=40+60
,,Inntekter
,,Bonus,Budsjett,,500
";
        let parsed = ImportService::new(&storage)
            .parse(sheet.as_bytes(), 2024)
            .await
            .unwrap();

        assert_eq!(parsed.sheet_categories.len(), 2);
        assert_eq!(parsed.suggested_mapping.get("MAT"), Some(&food.id));
        assert!(!parsed.suggested_mapping.contains_key("Bonus"));
    }

    #[tokio::test]
    async fn test_validate_reports_problems() {
        let (storage, food, salary) = setup().await;
        let service = ImportService::new(&storage);
        let sheet = parsed(vec![
            sheet_category("Mat", CategoryType::Expenses),
            sheet_category("Lønn", CategoryType::Income),
            sheet_category("Ukjent", CategoryType::Expenses),
        ]);

        let mut mapping = CategoryMapping::new();
        mapping.insert("Mat".into(), food.id);
        mapping.insert("Lønn".into(), food.id);
        let result = service.validate(&sheet, &mapping).await.unwrap();
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().any(|e| e.contains("'Ukjent' not mapped")));
        assert!(result.errors.iter().any(|e| e.contains("is income in the sheet")));

        mapping.insert("Lønn".into(), salary.id);
        mapping.insert("Ukjent".into(), CategoryId::new());
        let result = service.validate(&sheet, &mapping).await.unwrap();
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("which does not exist"));
    }

    #[tokio::test]
    async fn test_execute_writes_everything() {
        let (storage, food, salary) = setup().await;
        {
            let mut conn = storage.acquire().await.unwrap();
            budget::upsert(&mut conn, &BudgetEntry::new(food.id, 2024, 1, Amount::new(1), None))
                .await
                .unwrap();
        }
        let service = ImportService::new(&storage);
        let sheet = parsed(vec![
            sheet_category("Mat", CategoryType::Expenses),
            sheet_category("Lønn", CategoryType::Income),
        ]);
        let mut mapping = CategoryMapping::new();
        mapping.insert("Mat".into(), food.id);
        mapping.insert("Lønn".into(), salary.id);

        let validation = service.validate(&sheet, &mapping).await.unwrap();
        assert!(validation.valid);
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].contains("2024-01 already exists - will overwrite"));
        assert_eq!(validation.summary.budget_count, 4);
        assert_eq!(validation.summary.transaction_count, 4);

        let summary = service.execute(&sheet, &mapping).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                budget_count: 4,
                transaction_count: 4,
                template_count: 2,
            }
        );
        assert_eq!(row_counts(&storage, food.id).await, (2, 2));

        let mut conn = storage.acquire().await.unwrap();
        let entry = budget::find(&mut conn, food.id, 2024, 1).await.unwrap().unwrap();
        assert_eq!(entry.amount, Amount::new(4000));
        let payee = payees::get_by_name(&mut conn, IMPORT_PAYEE_NAME).await.unwrap().unwrap();
        assert_eq!(payee.payee_type, PayeeType::Generic);
        let txns = transactions::list_for_category(&mut conn, food.id, DateRange::year(2024))
            .await
            .unwrap();
        assert!(txns.iter().all(|t| t.transaction.date.to_string() == "2024-01-01"));
        assert!(txns.iter().all(|t| t.transaction.payee_id == Some(payee.id)));
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_mapping() {
        let (storage, food, _) = setup().await;
        let sheet = parsed(vec![
            sheet_category("Mat", CategoryType::Expenses),
            sheet_category("Ukjent", CategoryType::Expenses),
        ]);
        let mut mapping = CategoryMapping::new();
        mapping.insert("Mat".into(), food.id);

        let err = ImportService::new(&storage)
            .execute(&sheet, &mapping)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(row_counts(&storage, food.id).await, (0, 0));
    }

    #[tokio::test]
    async fn test_failed_batch_rolls_back() {
        let (storage, food, _) = setup().await;
        let sheet = parsed(vec![
            sheet_category("Mat", CategoryType::Expenses),
            sheet_category("Ukjent", CategoryType::Expenses),
        ]);
        let mut mapping = CategoryMapping::new();
        mapping.insert("Mat".into(), food.id);
        mapping.insert("Ukjent".into(), CategoryId::new());

        {
            let mut tx = storage.begin().await.unwrap();
            let result = apply_import(&mut tx, &sheet, &mapping).await;
            assert!(result.is_err());
        }

        assert_eq!(row_counts(&storage, food.id).await, (0, 0));
        let mut conn = storage.acquire().await.unwrap();
        assert!(payees::get_by_name(&mut conn, IMPORT_PAYEE_NAME).await.unwrap().is_none());
        assert!(!templates::exists(&mut conn, 2024, food.id).await.unwrap());
    }
}
