//! Category Trend Report
//!
//! Compares a category's budget and actual figures for a year with the year
//! before, month by month and in total, and classifies each change as an
//! arrow with a colour.

use serde::Serialize;

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::period::validate_year;
use crate::models::{Amount, BudgetEntry, CategoryId, CategoryType, DateRange, Transaction, YearMonth};
use crate::storage::{budget, categories, transactions, Storage};

/// Changes up to this many percent are shown as flat
pub const FLAT_THRESHOLD: f64 = 5.0;

/// Changes up to this many percent are shown as a diagonal arrow
pub const MODERATE_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendColor {
    Success,
    Danger,
    Secondary,
}

/// Classified change between two values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub color: TrendColor,
    /// Absolute change in percent of the previous value
    pub percentage_change: f64,
}

/// Classify the change from `previous` to `current`; `None` if either side
/// has no data
pub fn compute_trend(
    current: Option<Amount>,
    previous: Option<Amount>,
    category_type: CategoryType,
) -> Option<Trend> {
    let (current, previous) = (current?, previous?);

    let change = if previous.is_zero() {
        if current.is_zero() {
            0.0
        } else {
            100.0
        }
    } else {
        ((current - previous).units() as f64 / previous.units() as f64 * 100.0).abs()
    };

    if change <= FLAT_THRESHOLD {
        return Some(Trend {
            direction: TrendDirection::Right,
            color: TrendColor::Secondary,
            percentage_change: round1(change),
        });
    }

    let increased = current > previous;
    let direction = match (increased, change <= MODERATE_THRESHOLD) {
        (true, true) => TrendDirection::UpRight,
        (true, false) => TrendDirection::Up,
        (false, true) => TrendDirection::DownRight,
        (false, false) => TrendDirection::Down,
    };
    let good = increased == category_type.is_income();
    let color = if good {
        TrendColor::Success
    } else {
        TrendColor::Danger
    };

    Some(Trend {
        direction,
        color,
        percentage_change: round1(change),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Both years' figures for one month
#[derive(Debug, Clone, Serialize)]
pub struct MonthTrend {
    pub month: u32,
    pub current_budget: Option<Amount>,
    pub previous_budget: Option<Amount>,
    pub current_actual: Option<Amount>,
    pub previous_actual: Option<Amount>,
    pub budget_trend: Option<Trend>,
    pub actual_trend: Option<Trend>,
}

/// Category Trend Report
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTrendReport {
    pub year: i32,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_type: CategoryType,
    pub months: Vec<MonthTrend>,
    pub budget_total_trend: Option<Trend>,
    pub actual_total_trend: Option<Trend>,
}

impl CategoryTrendReport {
    pub async fn generate(
        storage: &Storage,
        year: i32,
        category_id: CategoryId,
    ) -> MoneybagsResult<Self> {
        validate_year(year).map_err(|e| MoneybagsError::Validation(e.to_string()))?;

        let mut conn = storage.acquire().await?;
        let category = categories::get(&mut conn, category_id)
            .await?
            .ok_or_else(|| MoneybagsError::category_not_found(category_id.to_string()))?;

        let current_entries = budget::list_for_category_year(&mut conn, category_id, year).await?;
        let previous_entries =
            budget::list_for_category_year(&mut conn, category_id, year - 1).await?;

        let range = DateRange {
            start: DateRange::year(year - 1).start,
            end: DateRange::year(year).end,
        };
        let txns: Vec<Transaction> = transactions::list_for_category(&mut conn, category_id, range)
            .await?
            .into_iter()
            .map(|t| t.transaction)
            .collect();

        let mut report = Self::build(
            year,
            category.category_type,
            &current_entries,
            &previous_entries,
            &txns,
        );
        report.category_id = category.id;
        report.category_name = category.name;
        Ok(report)
    }

    /// Assemble the report from already-loaded rows of both years
    pub fn build(
        year: i32,
        category_type: CategoryType,
        current_entries: &[BudgetEntry],
        previous_entries: &[BudgetEntry],
        transactions: &[Transaction],
    ) -> Self {
        let months: Vec<MonthTrend> = (1..=12)
            .map(|month| {
                let current_budget = budget_for_month(current_entries, month);
                let previous_budget = budget_for_month(previous_entries, month);
                let current_actual = actual_for_range(transactions, YearMonth { year, month }.range());
                let previous_actual =
                    actual_for_range(transactions, YearMonth { year: year - 1, month }.range());

                MonthTrend {
                    month,
                    current_budget,
                    previous_budget,
                    current_actual,
                    previous_actual,
                    budget_trend: compute_trend(current_budget, previous_budget, category_type),
                    actual_trend: compute_trend(current_actual, previous_actual, category_type),
                }
            })
            .collect();

        let budget_total_trend = compute_trend(
            sum_present(months.iter().map(|m| m.current_budget)),
            sum_present(months.iter().map(|m| m.previous_budget)),
            category_type,
        );
        let actual_total_trend = compute_trend(
            sum_present(months.iter().map(|m| m.current_actual)),
            sum_present(months.iter().map(|m| m.previous_actual)),
            category_type,
        );

        Self {
            year,
            category_id: CategoryId::default(),
            category_name: String::new(),
            category_type,
            months,
            budget_total_trend,
            actual_total_trend,
        }
    }
}

fn budget_for_month(entries: &[BudgetEntry], month: u32) -> Option<Amount> {
    entries.iter().find(|e| e.month == month).map(|e| e.amount)
}

/// `None` when no transaction falls in the range
fn actual_for_range(transactions: &[Transaction], range: DateRange) -> Option<Amount> {
    let mut matching = transactions.iter().filter(|t| range.contains(t.date)).peekable();
    matching.peek()?;
    Some(matching.map(|t| t.amount).sum())
}

fn sum_present(values: impl Iterator<Item = Option<Amount>>) -> Option<Amount> {
    values.flatten().fold(None, |acc, v| Some(acc.unwrap_or_default() + v))
}
