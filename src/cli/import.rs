//! CLI command handler for spreadsheet import
//!
//! Parses the sheet, maps its category names onto existing categories and
//! imports budget entries and transactions for one year.

use std::path::PathBuf;

use clap::Args;

use super::category::resolve_category;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::services::import::CategoryMapping;
use crate::services::ImportService;
use crate::storage::Storage;

/// Arguments of the import command
#[derive(Args)]
pub struct ImportArgs {
    /// CSV export of the budget spreadsheet
    pub file: PathBuf,

    /// Year the sheet covers
    #[arg(short, long)]
    pub year: i32,

    /// Map a sheet category to an existing category (Sheet=Category)
    #[arg(short, long = "map", value_name = "SHEET=CATEGORY")]
    pub mappings: Vec<String>,

    /// Validate and show what would be imported without writing
    #[arg(long)]
    pub dry_run: bool,
}

fn split_mapping(raw: &str) -> MoneybagsResult<(&str, &str)> {
    raw.split_once('=')
        .map(|(sheet, category)| (sheet.trim(), category.trim()))
        .filter(|(sheet, category)| !sheet.is_empty() && !category.is_empty())
        .ok_or_else(|| {
            MoneybagsError::Validation(format!("Invalid mapping '{}': expected Sheet=Category", raw))
        })
}

/// Handle the import command
pub async fn handle_import_command(storage: &Storage, args: ImportArgs) -> MoneybagsResult<()> {
    let service = ImportService::new(storage);

    let bytes = std::fs::read(&args.file).map_err(|e| {
        MoneybagsError::Import(format!("Failed to read {}: {}", args.file.display(), e))
    })?;
    let parsed = service.parse(&bytes, args.year).await?;

    let mut mapping: CategoryMapping = parsed.suggested_mapping.clone();
    for raw in &args.mappings {
        let (sheet, category) = split_mapping(raw)?;
        let category = resolve_category(storage, category).await?;
        mapping.insert(sheet.to_string(), category.id);
    }

    println!(
        "Read {} categories from {} ({:?} layout)",
        parsed.sheet_categories.len(),
        args.file.display(),
        parsed.layout
    );
    for warning in &parsed.warnings {
        println!("  skipped: {}", warning);
    }

    let validation = service.validate(&parsed, &mapping).await?;
    for warning in &validation.warnings {
        println!("  warning: {}", warning);
    }
    if !validation.valid {
        for error in &validation.errors {
            println!("  error: {}", error);
        }
        return Err(MoneybagsError::Validation(format!(
            "{} mapping error(s); use --map Sheet=Category",
            validation.errors.len()
        )));
    }

    println!(
        "Would import {} budget entries and {} transactions",
        validation.summary.budget_count, validation.summary.transaction_count
    );
    if args.dry_run {
        println!("Dry run: nothing written.");
        return Ok(());
    }

    let summary = service.execute(&parsed, &mapping).await?;
    println!(
        "Imported {} budget entries and {} transactions for {}",
        summary.budget_count, summary.transaction_count, parsed.year
    );
    if summary.template_count > 0 {
        println!("Added {} categories to the {} template", summary.template_count, parsed.year);
    }

    Ok(())
}
