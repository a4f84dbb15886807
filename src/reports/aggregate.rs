//! Budget vs. actual arithmetic
//!
//! Pure reductions over rows that were already fetched from storage.

use serde::Serialize;

use crate::models::{Amount, BudgetEntry, CategoryType, DateRange, Transaction};

/// Sum of the monthly budget entries (callers pass one category and year)
pub fn yearly_budget_total<'a>(entries: impl IntoIterator<Item = &'a BudgetEntry>) -> Amount {
    entries.into_iter().map(|e| e.amount).sum()
}

/// Sum of the transaction amounts dated inside `range`
pub fn actual_total<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    range: DateRange,
) -> Amount {
    transactions
        .into_iter()
        .filter(|t| range.contains(t.date))
        .map(|t| t.amount)
        .sum()
}

/// Favourable-positive difference: money left over for expenses, money
/// earned beyond plan for income
pub fn variance(category_type: CategoryType, budget: Amount, actual: Amount) -> Amount {
    match category_type {
        CategoryType::Expenses => budget - actual,
        CategoryType::Income => actual - budget,
    }
}

/// Raw `budget - actual`
pub fn difference(budget: Amount, actual: Amount) -> Amount {
    budget - actual
}

/// `actual / budget * 100`, or 0 when nothing was budgeted
pub fn percentage(actual: Amount, budget: Amount) -> f64 {
    if budget.is_zero() {
        return 0.0;
    }
    let pct = actual.units() as f64 / budget.units() as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Budget and actual for one category over one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceFigures {
    pub budget: Amount,
    pub actual: Amount,
    pub difference: Amount,
    pub variance: Amount,
    pub percentage: f64,
}

impl VarianceFigures {
    pub fn compute(category_type: CategoryType, budget: Amount, actual: Amount) -> Self {
        Self {
            budget,
            actual,
            difference: difference(budget, actual),
            variance: variance(category_type, budget, actual),
            percentage: percentage(actual, budget),
        }
    }
}
