//! CLI commands for reports

use clap::Subcommand;

use super::category::resolve_category;
use crate::display::{format_overview, format_trends, format_variance};
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::reports::{CategoryTrendReport, MonthlyVarianceReport, YearOverviewReport};
use crate::services::ConfigurationService;
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Budget against actual for every category in a year
    Overview {
        year: i32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Month-by-month comparison of a category with the previous year
    Trends {
        /// Category name or ID
        category: String,
        year: i32,
        #[arg(long)]
        json: bool,
    },

    /// Budget against actual for one category in one month
    Variance {
        /// Category name or ID
        category: String,
        year: i32,
        month: u32,
        #[arg(long)]
        json: bool,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> MoneybagsResult<()> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| MoneybagsError::Json(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Handle a report command
pub async fn handle_report_command(storage: &Storage, cmd: ReportCommands) -> MoneybagsResult<()> {
    let currency = ConfigurationService::new(storage).currency_format().await?;

    match cmd {
        ReportCommands::Overview { year, json } => {
            let report = YearOverviewReport::generate(storage, year).await?;
            if json {
                return print_json(&report);
            }
            print!("{}", format_overview(&report, currency));
        }
        ReportCommands::Trends {
            category,
            year,
            json,
        } => {
            let category = resolve_category(storage, &category).await?;
            let report = CategoryTrendReport::generate(storage, year, category.id).await?;
            if json {
                return print_json(&report);
            }
            print!("{}", format_trends(&report, currency));
        }
        ReportCommands::Variance {
            category,
            year,
            month,
            json,
        } => {
            let category = resolve_category(storage, &category).await?;
            let report = MonthlyVarianceReport::generate(storage, year, month, category.id).await?;
            if json {
                return print_json(&report);
            }
            print!("{}", format_variance(&report, currency));
        }
    }

    Ok(())
}
