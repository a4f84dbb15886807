//! Literal-sum formula parsing for spreadsheet cells
//!
//! Budget sheets record each purchase as a term in an addition formula
//! (`=575+2182`). Only non-negative literal terms joined by `+` are accepted;
//! parentheses are treated as grouping and ignored.

use std::fmt;

use thiserror::Error;

use crate::models::money::MAX_AMOUNT_UNITS;
use crate::models::Amount;

/// Characters that signal an operation other than addition
const FORBIDDEN_OPERATORS: &[char] = &['*', '/', '^', '&', '%', '<', '>', ',', ':', ';'];

/// Why a cell could not be read as a literal sum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaErrorKind {
    #[error("Complex formula not supported ({0})")]
    Unsupported(String),

    #[error("Only addition (+) supported")]
    OnlyAddition,

    #[error("Negative value not allowed ({0})")]
    Negative(String),

    #[error("Invalid number format: {0}")]
    InvalidNumber(String),

    #[error("Value too large ({0}), at most {max}", max = MAX_AMOUNT_UNITS)]
    TooLarge(String),
}

/// A formula error located in the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaError {
    /// 1-based row number
    pub row: usize,
    /// Column letter, e.g. `C`
    pub column: String,
    pub kind: FormulaErrorKind,
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}, Column {}: {}", self.row, self.column, self.kind)
    }
}

impl std::error::Error for FormulaError {}

/// Extract the literal terms of a cell
///
/// Empty cells yield no amounts.
pub fn extract_amounts(cell: &str, row: usize, column: &str) -> Result<Vec<Amount>, FormulaError> {
    parse_terms(cell).map_err(|kind| FormulaError {
        row,
        column: column.to_string(),
        kind,
    })
}

fn parse_terms(cell: &str) -> Result<Vec<Amount>, FormulaErrorKind> {
    let text = cell.trim();
    let text = text.strip_prefix('=').unwrap_or(text);
    let text: String = text.chars().filter(|c| *c != '(' && *c != ')').collect();

    if let Some(name) = first_alphabetic_run(&text) {
        return Err(FormulaErrorKind::Unsupported(name));
    }
    if text.contains(FORBIDDEN_OPERATORS) {
        return Err(FormulaErrorKind::OnlyAddition);
    }

    let mut amounts = Vec::new();
    for part in text.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        amounts.push(parse_term(part)?);
    }
    Ok(amounts)
}

fn parse_term(part: &str) -> Result<Amount, FormulaErrorKind> {
    if let Some(rest) = part.strip_prefix('-') {
        let rest = rest.trim();
        if parse_literal(rest).is_some() {
            return Err(FormulaErrorKind::Negative(format!("-{}", rest)));
        }
        return Err(FormulaErrorKind::OnlyAddition);
    }
    if part.contains('-') {
        return Err(FormulaErrorKind::OnlyAddition);
    }
    let whole =
        parse_literal(part).ok_or_else(|| FormulaErrorKind::InvalidNumber(part.to_string()))?;
    whole
        .parse::<i64>()
        .ok()
        .map(Amount::new)
        .filter(Amount::is_within_limit)
        .ok_or_else(|| FormulaErrorKind::TooLarge(part.to_string()))
}

/// The whole-number digits of `digits[.digits]`; the fraction is truncated
fn parse_literal(s: &str) -> Option<&str> {
    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (s, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());

    if !all_digits(whole) {
        return None;
    }
    if let Some(fraction) = fraction {
        if !all_digits(fraction) {
            return None;
        }
    }
    Some(whole)
}

fn first_alphabetic_run(text: &str) -> Option<String> {
    let start = text.find(|c: char| c.is_alphabetic())?;
    let run: String = text[start..]
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();
    Some(run.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(cell: &str) -> Vec<i64> {
        extract_amounts(cell, 1, "A")
            .unwrap()
            .into_iter()
            .map(|a| a.units())
            .collect()
    }

    fn kind(cell: &str) -> FormulaErrorKind {
        extract_amounts(cell, 1, "A").unwrap_err().kind
    }

    #[test]
    fn test_literal_sums() {
        assert_eq!(amounts("=575+2182"), vec![575, 2182]);
        assert_eq!(amounts("104571"), vec![104571]);
        assert_eq!(amounts("=104571"), vec![104571]);
        assert_eq!(amounts("0"), vec![0]);
        assert_eq!(amounts("55615.0"), vec![55615]);
        assert_eq!(amounts("=10.9+1"), vec![10, 1]);
    }

    #[test]
    fn test_parentheses_are_grouping() {
        assert_eq!(amounts("=((427+275)+7292)+200"), vec![427, 275, 7292, 200]);
    }

    #[test]
    fn test_empty_cells() {
        assert!(amounts("").is_empty());
        assert!(amounts("   ").is_empty());
        assert!(amounts("=").is_empty());
        assert_eq!(amounts("=100++200"), vec![100, 200]);
    }

    #[test]
    fn test_negative_values_rejected() {
        assert_eq!(kind("=-500"), FormulaErrorKind::Negative("-500".into()));
        assert_eq!(kind("=100+-600"), FormulaErrorKind::Negative("-600".into()));
    }

    #[test]
    fn test_functions_rejected() {
        assert_eq!(kind("=IF(A1>0,1,2)"), FormulaErrorKind::Unsupported("IF".into()));
        assert_eq!(kind("=sum(1+2)"), FormulaErrorKind::Unsupported("SUM".into()));
    }

    #[test]
    fn test_other_operators_rejected() {
        assert_eq!(kind("=43*2"), FormulaErrorKind::OnlyAddition);
        assert_eq!(kind("=10/2"), FormulaErrorKind::OnlyAddition);
        assert_eq!(kind("=100-50"), FormulaErrorKind::OnlyAddition);
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(kind("1 000"), FormulaErrorKind::InvalidNumber("1 000".into()));
        assert_eq!(kind("=1.2.3"), FormulaErrorKind::InvalidNumber("1.2.3".into()));
    }

    #[test]
    fn test_terms_beyond_limit_rejected() {
        assert_eq!(amounts("=1000000000000+1"), vec![1_000_000_000_000, 1]);
        assert_eq!(
            kind("=1000000000001"),
            FormulaErrorKind::TooLarge("1000000000001".into())
        );
        assert_eq!(
            kind("=1+99999999999999999999"),
            FormulaErrorKind::TooLarge("99999999999999999999".into())
        );
    }

    #[test]
    fn test_error_names_location() {
        let err = extract_amounts("=-500", 10, "C").unwrap_err();
        assert_eq!(err.to_string(), "Row 10, Column C: Negative value not allowed (-500)");
    }
}
