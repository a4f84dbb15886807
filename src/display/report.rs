//! Report formatting for terminal output
//!
//! Text renderings of the year overview, category trends and monthly
//! variance reports, plus the small formatting helpers they share.

use crate::models::period::{month_name, MONTH_NAMES};
use crate::models::{Amount, CurrencyFormat};
use crate::reports::{
    CategoryOverviewRow, CategoryTrendReport, MonthlyVarianceReport, Trend, TrendDirection,
    YearOverviewReport,
};

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".chars().take(max_len).collect()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

fn arrow(trend: Option<&Trend>) -> String {
    match trend {
        None => " ".to_string(),
        Some(t) => {
            let symbol = match t.direction {
                TrendDirection::Up => "↑",
                TrendDirection::UpRight => "↗",
                TrendDirection::Right => "→",
                TrendDirection::DownRight => "↘",
                TrendDirection::Down => "↓",
            };
            format!("{} {}", symbol, format_percentage(t.percentage_change))
        }
    }
}

fn optional_amount(amount: Option<Amount>, currency: CurrencyFormat) -> String {
    amount.map(|a| a.format(currency)).unwrap_or_else(|| "-".to_string())
}

fn overview_section(
    output: &mut String,
    title: &str,
    rows: &[CategoryOverviewRow],
    currency: CurrencyFormat,
) {
    output.push_str(&format!("{}\n", title));
    for row in rows {
        output.push_str(&format!(
            "  {:<24} {:>14} {:>14} {:>14} {:>6}\n",
            truncate(&row.category_name, 24),
            row.total.budget.format(currency),
            row.total.actual.format(currency),
            row.total.variance.format(currency),
            format_percentage(row.total.percentage)
        ));
    }
}

/// Format the year overview with yearly totals per category
pub fn format_overview(report: &YearOverviewReport, currency: CurrencyFormat) -> String {
    let mut output = format!("Budget overview {}\n", report.year);
    output.push_str(&format!(
        "  {:<24} {:>14} {:>14} {:>14} {:>6}\n",
        "Category", "Budget", "Actual", "Variance", "%"
    ));
    output.push_str(&separator(78));
    output.push('\n');

    overview_section(&mut output, "Income", &report.income, currency);
    overview_section(&mut output, "Expenses", &report.expenses, currency);

    output.push_str(&separator(78));
    output.push('\n');
    output.push_str(&format!(
        "  {:<24} {:>14} {:>14}\n",
        "Net",
        report.net_budget.format(currency),
        report.net_actual.format(currency)
    ));
    output
}

/// Format a category's year-over-year trends month by month
pub fn format_trends(report: &CategoryTrendReport, currency: CurrencyFormat) -> String {
    let mut output = format!(
        "{} ({}) {} vs {}\n",
        report.category_name,
        report.category_type,
        report.year,
        report.year - 1
    );
    output.push_str(&format!(
        "  {:<5} {:>12} {:>12} {:>10}   {:>12} {:>12} {:>10}\n",
        "Month", "Budget", "Prev", "", "Actual", "Prev", ""
    ));
    for (month, name) in report.months.iter().zip(MONTH_NAMES) {
        output.push_str(&format!(
            "  {:<5} {:>12} {:>12} {:>10}   {:>12} {:>12} {:>10}\n",
            name,
            optional_amount(month.current_budget, currency),
            optional_amount(month.previous_budget, currency),
            arrow(month.budget_trend.as_ref()),
            optional_amount(month.current_actual, currency),
            optional_amount(month.previous_actual, currency),
            arrow(month.actual_trend.as_ref()),
        ));
    }
    output.push_str(&format!(
        "  Total budget {}  Total actual {}\n",
        arrow(report.budget_total_trend.as_ref()),
        arrow(report.actual_total_trend.as_ref())
    ));
    output
}

/// Format budget against actual for one category and month
pub fn format_variance(report: &MonthlyVarianceReport, currency: CurrencyFormat) -> String {
    let f = &report.figures;
    format!(
        "{} {} {}\n  Budget:     {}\n  Actual:     {}\n  Difference: {}\n  Variance:   {}\n  Used:       {}\n",
        report.category_name,
        month_name(report.month),
        report.year,
        f.budget.format(currency),
        f.actual.format(currency),
        f.difference.format(currency),
        f.variance.format(currency),
        format_percentage(f.percentage)
    )
}
