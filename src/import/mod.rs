//! Spreadsheet import
//!
//! Reads budget sheets whose cells hold literal addition formulas such as
//! `=575+2182`.

pub mod formula;
pub mod sheet;

pub use formula::{extract_amounts, FormulaError, FormulaErrorKind};
pub use sheet::{parse_sheet, ParsedSheet, SheetCategory, SheetGrid, SheetLayout};
