//! Transaction CLI commands

use clap::Subcommand;

use super::category::resolve_category;
use crate::display::{format_recent, format_transaction_list};
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{Amount, TransactionId};
use crate::services::transaction::CreateTransaction;
use crate::services::{ConfigurationService, PayeeService, TransactionService};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record an actual amount against a category
    Add {
        /// Category name or ID
        category: String,
        /// Amount in whole currency units
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Payee name or ID
        #[arg(short, long)]
        payee: Option<String>,
        /// Optional comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// List a category's transactions for a year or month
    List {
        /// Category name or ID
        category: String,
        year: i32,
        /// Limit to one month (1-12)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Show the newest transactions
    Recent {
        /// Number of transactions
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub async fn handle_transaction_command(
    storage: &Storage,
    cmd: TransactionCommands,
) -> MoneybagsResult<()> {
    let service = TransactionService::new(storage);
    let currency = ConfigurationService::new(storage).currency_format().await?;

    match cmd {
        TransactionCommands::Add {
            category,
            amount,
            date,
            payee,
            comment,
        } => {
            let category = resolve_category(storage, &category).await?;
            let amount =
                Amount::parse(&amount).map_err(|e| MoneybagsError::Validation(e.to_string()))?;
            let payee_id = match payee {
                Some(payee) => Some(
                    PayeeService::new(storage)
                        .find(&payee)
                        .await?
                        .ok_or_else(|| MoneybagsError::payee_not_found(&payee))?
                        .id,
                ),
                None => None,
            };
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive().to_string());

            let txn = service
                .create(CreateTransaction {
                    category_id: category.id,
                    payee_id,
                    date,
                    amount,
                    comment,
                })
                .await?;
            println!(
                "Recorded {} on '{}' at {}",
                txn.amount.format(currency),
                category.name,
                txn.date
            );
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List {
            category,
            year,
            month,
        } => {
            let category = resolve_category(storage, &category).await?;
            let list = service.list(category.id, year, month).await?;
            match month {
                Some(month) => println!("{} {}-{:02}", category.name, year, month),
                None => println!("{} {}", category.name, year),
            }
            print!("{}", format_transaction_list(&list, currency));
        }

        TransactionCommands::Recent { limit } => {
            let recent = service.recent(limit).await?;
            print!("{}", format_recent(&recent, currency));
        }

        TransactionCommands::Delete { id } => {
            let id: TransactionId = id
                .parse()
                .map_err(|_| MoneybagsError::Validation(format!("Invalid transaction ID '{}'", id)))?;
            service.delete(id).await?;
            println!("Deleted transaction {}", id.short());
        }
    }

    Ok(())
}
