//! Budget CLI commands

use clap::Subcommand;

use super::category::resolve_category;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::period::month_name;
use crate::models::{Amount, CurrencyFormat};
use crate::services::budget::{BudgetYearData, SaveBudgetEntry};
use crate::services::{BudgetService, ConfigurationService};
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show the budget grid for a year
    Show {
        year: i32,
    },

    /// Set the budget for a category and month
    Set {
        /// Category name or ID
        category: String,
        year: i32,
        month: u32,
        /// Amount in whole currency units
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Delete the budget entry for a category and month
    Delete {
        /// Category name or ID
        category: String,
        year: i32,
        month: u32,
    },
}

/// Handle a budget command
pub async fn handle_budget_command(storage: &Storage, cmd: BudgetCommands) -> MoneybagsResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Show { year } => {
            let data = service.year_data(year).await?;
            let currency = ConfigurationService::new(storage).currency_format().await?;
            print!("{}", format_budget_year(&data, currency));
        }

        BudgetCommands::Set {
            category,
            year,
            month,
            amount,
            comment,
        } => {
            let category = resolve_category(storage, &category).await?;
            let amount =
                Amount::parse(&amount).map_err(|e| MoneybagsError::Validation(e.to_string()))?;
            let entry = service
                .save_entry(SaveBudgetEntry {
                    category_id: category.id,
                    year,
                    month,
                    amount,
                    comment,
                })
                .await?;
            let currency = ConfigurationService::new(storage).currency_format().await?;
            println!(
                "Budget for '{}' {}-{:02} set to {}",
                category.name,
                entry.year,
                entry.month,
                entry.amount.format(currency)
            );
        }

        BudgetCommands::Delete {
            category,
            year,
            month,
        } => {
            let category = resolve_category(storage, &category).await?;
            let entry = service
                .get_entry(category.id, year, month)
                .await?
                .ok_or_else(|| {
                    MoneybagsError::budget_entry_not_found(format!(
                        "{} {}-{:02}",
                        category.name, year, month
                    ))
                })?;
            service.delete_entry(entry.id).await?;
            println!("Deleted budget for '{}' {}-{:02}", category.name, year, month);
        }
    }

    Ok(())
}

fn format_budget_year(data: &BudgetYearData, currency: CurrencyFormat) -> String {
    let mut output = format!("Budget {}\n", data.year);

    if data.categories.is_empty() {
        output.push_str("No categories in this year's template.\n");
        return output;
    }

    for category in &data.categories {
        output.push_str(&format!("\n{} ({})\n", category.name, category.category_type));
        let Some(months) = data.budget_entries.get(&category.id) else {
            output.push_str("  no budget entries\n");
            continue;
        };
        let mut total = Amount::zero();
        for (month, cell) in months {
            total += cell.amount;
            output.push_str(&format!(
                "  {}  {:>14}",
                month_name(*month),
                cell.amount.format(currency)
            ));
            if let Some(comment) = &cell.comment {
                output.push_str(&format!("  {}", comment));
            }
            output.push('\n');
        }
        output.push_str(&format!("  Total {:>13}\n", total.format(currency)));
    }

    output
}
