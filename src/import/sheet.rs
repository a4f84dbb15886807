//! Budget sheet parsing
//!
//! The sheet arrives as a CSV rendering of the spreadsheet with formula text
//! kept in the cells. Rows and columns are addressed the way the spreadsheet
//! shows them: 1-based rows, column letters.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::formula::extract_amounts;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::period::validate_year;
use crate::models::money::MAX_AMOUNT_UNITS;
use crate::models::{Amount, CategoryId, CategoryType};

/// Marker for budget rows in the labelled layout
const BUDGET_LABEL: &str = "Budsjett";
const EXPENSE_MARKER: &str = "Utgifter";
const INCOME_MARKER: &str = "Inntekter";

/// Row labels of the block layout that never name a category
const BLOCK_LABELS: &[&str] = &[
    "Inntekter",
    "Utgifter",
    "Balanse",
    "Budsjett",
    "Resultat",
    "Differanse",
];

/// First income block row in the block layout
const BLOCK_INCOME_START: usize = 8;
const BLOCK_INCOME_STRIDE: usize = 4;
const BLOCK_EXPENSE_STRIDE: usize = 3;
/// Expense blocks start before this row
const BLOCK_EXPENSE_END: usize = 60;

/// Column of January in each layout (F and C)
const LABELLED_FIRST_MONTH_COL: usize = 6;
const BLOCK_FIRST_MONTH_COL: usize = 3;

/// An in-memory grid of cell text
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    /// Read a CSV grid; rows may have different lengths and blank lines
    /// are kept as empty rows
    pub fn from_reader<R: Read>(mut reader: R) -> MoneybagsResult<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| MoneybagsError::Import(format!("Failed to read sheet: {}", e)))?;
        let text = mark_blank_lines(&text);

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| {
                MoneybagsError::Import(format!("Failed to read sheet row {}: {}", rows.len() + 1, e))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { rows })
    }

    pub fn from_bytes(bytes: &[u8]) -> MoneybagsResult<Self> {
        Self::from_reader(bytes)
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Trimmed cell text at a 1-based row and column, empty if absent
    pub fn cell(&self, row: usize, col: usize) -> &str {
        if row == 0 || col == 0 {
            return "";
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// Put a placeholder cell on every blank line outside a quoted cell; the
/// csv reader would otherwise drop the line and shift every later row
fn mark_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_quotes = false;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        let at_line_start = matches!(prev, None | Some('\n') | Some('\r'));
        let crlf_tail = prev == Some('\r') && c == '\n';
        if !in_quotes && at_line_start && !crlf_tail && (c == '\n' || c == '\r') {
            out.push(',');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Spreadsheet column letter for a 1-based column index
pub fn column_letter(col: usize) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Which arrangement the sheet uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetLayout {
    /// Name in C, `Budsjett` in D, months F..Q, actuals on the next row
    Labelled,
    /// Name in B, budget and actual rows below, months C..N
    Block,
}

/// One category read from the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Month → summed budget
    pub budget: BTreeMap<u32, Amount>,
    /// Month → individual actual amounts
    pub actuals: BTreeMap<u32, Vec<Amount>>,
}

impl SheetCategory {
    pub fn transaction_count(&self) -> usize {
        self.actuals.values().map(Vec::len).sum()
    }
}

/// Result of reading a sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSheet {
    pub year: i32,
    pub layout: SheetLayout,
    pub sheet_categories: Vec<SheetCategory>,
    /// Budget cells that were skipped
    pub warnings: Vec<String>,
    /// Sheet category name → existing category with the same name
    #[serde(default)]
    pub suggested_mapping: BTreeMap<String, CategoryId>,
}

/// Parse a sheet grid for the given year
pub fn parse_sheet(grid: &SheetGrid, year: i32) -> MoneybagsResult<ParsedSheet> {
    validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))?;

    let layout = detect_layout(grid);
    debug!(?layout, rows = grid.height(), "Detected sheet layout");

    let mut warnings = Vec::new();
    let sheet_categories = match layout {
        SheetLayout::Labelled => parse_labelled(grid, &mut warnings)?,
        SheetLayout::Block => parse_block(grid, &mut warnings)?,
    };

    if sheet_categories.is_empty() {
        return Err(MoneybagsError::Import(
            "No categories found in sheet".into(),
        ));
    }

    info!(
        year,
        categories = sheet_categories.len(),
        warnings = warnings.len(),
        "Parsed budget sheet"
    );

    Ok(ParsedSheet {
        year,
        layout,
        sheet_categories,
        warnings,
        suggested_mapping: BTreeMap::new(),
    })
}

fn detect_layout(grid: &SheetGrid) -> SheetLayout {
    let labelled = (1..=grid.height()).any(|row| grid.cell(row, 4) == BUDGET_LABEL);
    if labelled {
        SheetLayout::Labelled
    } else {
        SheetLayout::Block
    }
}

fn parse_labelled(
    grid: &SheetGrid,
    warnings: &mut Vec<String>,
) -> MoneybagsResult<Vec<SheetCategory>> {
    let is_category_row = |row: usize| grid.cell(row, 4) == BUDGET_LABEL;
    let find_marker = |marker: &str| {
        (1..=grid.height()).find(|&row| !is_category_row(row) && grid.cell(row, 3).contains(marker))
    };

    let expense_row = find_marker(EXPENSE_MARKER).ok_or_else(|| {
        MoneybagsError::Import(format!("Could not find '{}' section in sheet", EXPENSE_MARKER))
    })?;
    let income_row = find_marker(INCOME_MARKER).ok_or_else(|| {
        MoneybagsError::Import(format!("Could not find '{}' section in sheet", INCOME_MARKER))
    })?;

    let mut categories = Vec::new();
    for row in 1..=grid.height() {
        let name = grid.cell(row, 3);
        if name.is_empty() || !is_category_row(row) {
            continue;
        }
        if name.contains("Total") {
            debug!(row, category = name, "Skipping total row");
            continue;
        }

        let category_type = if row > expense_row && (row < income_row || income_row < expense_row) {
            CategoryType::Expenses
        } else if row > income_row {
            CategoryType::Income
        } else {
            debug!(row, category = name, "Skipping category outside sections");
            continue;
        };

        if let Some(category) = read_category(
            grid,
            name,
            category_type,
            row,
            row + 1,
            LABELLED_FIRST_MONTH_COL,
            warnings,
        )? {
            categories.push(category);
        }
    }
    Ok(categories)
}

fn parse_block(grid: &SheetGrid, warnings: &mut Vec<String>) -> MoneybagsResult<Vec<SheetCategory>> {
    let expense_row = (1..=grid.height())
        .find(|&row| grid.cell(row, 2).contains(EXPENSE_MARKER))
        .ok_or_else(|| {
            MoneybagsError::Import(format!("Could not find '{}' section in sheet", EXPENSE_MARKER))
        })?;

    let income_rows = (BLOCK_INCOME_START..expense_row)
        .step_by(BLOCK_INCOME_STRIDE)
        .map(|row| (row, CategoryType::Income));
    let expense_rows = (expense_row + 1..BLOCK_EXPENSE_END)
        .step_by(BLOCK_EXPENSE_STRIDE)
        .map(|row| (row, CategoryType::Expenses));

    let mut categories = Vec::new();
    for (row, category_type) in income_rows.chain(expense_rows) {
        let name = grid.cell(row, 2);
        if name.is_empty() || BLOCK_LABELS.contains(&name) {
            continue;
        }
        if let Some(category) = read_category(
            grid,
            name,
            category_type,
            row + 1,
            row + 2,
            BLOCK_FIRST_MONTH_COL,
            warnings,
        )? {
            categories.push(category);
        }
    }
    Ok(categories)
}

/// Sum of the terms of one cell, `None` past [`MAX_AMOUNT_UNITS`]
fn checked_total(amounts: &[Amount]) -> Option<Amount> {
    amounts
        .iter()
        .try_fold(0i64, |acc, a| acc.checked_add(a.units()))
        .map(Amount::new)
        .filter(Amount::is_within_limit)
}

/// Read twelve budget cells and twelve actual cells; `None` if all are empty
fn read_category(
    grid: &SheetGrid,
    name: &str,
    category_type: CategoryType,
    budget_row: usize,
    actual_row: usize,
    first_month_col: usize,
    warnings: &mut Vec<String>,
) -> MoneybagsResult<Option<SheetCategory>> {
    let mut budget = BTreeMap::new();
    let mut actuals = BTreeMap::new();

    for month in 1..=12u32 {
        let col = first_month_col + month as usize - 1;
        let letter = column_letter(col);

        match extract_amounts(grid.cell(budget_row, col), budget_row, &letter) {
            Ok(amounts) => match checked_total(&amounts) {
                Some(total) if !total.is_zero() => {
                    budget.insert(month, total);
                }
                Some(_) => {}
                None => warnings.push(format!(
                    "Category '{}': Row {}, Column {}: Budget total exceeds the limit of {} (budget cell skipped)",
                    name, budget_row, letter, MAX_AMOUNT_UNITS
                )),
            },
            Err(e) => warnings.push(format!("Category '{}': {} (budget cell skipped)", name, e)),
        }

        let amounts = extract_amounts(grid.cell(actual_row, col), actual_row, &letter)
            .map_err(|e| MoneybagsError::Import(format!("Category '{}': {}", name, e)))?;
        if !amounts.is_empty() {
            actuals.insert(month, amounts);
        }
    }

    if budget.is_empty() && actuals.is_empty() {
        debug!(category = name, "Skipping category with no data");
        return Ok(None);
    }

    Ok(Some(SheetCategory {
        name: name.to_string(),
        category_type,
        budget,
        actuals,
    }))
}
