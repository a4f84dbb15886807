//! Reports for Moneybags
//!
//! - Aggregation arithmetic (budget and actual totals, variance, percentage)
//! - Year overview per category and type
//! - Year-over-year category trends
//! - Monthly variance for a single category

pub mod aggregate;
pub mod budget_overview;
pub mod trends;
pub mod variance;

pub use aggregate::VarianceFigures;
pub use budget_overview::{CategoryOverviewRow, YearOverviewReport};
pub use trends::{CategoryTrendReport, Trend, TrendColor, TrendDirection};
pub use variance::MonthlyVarianceReport;
