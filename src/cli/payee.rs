//! Payee CLI commands

use clap::Subcommand;

use crate::display::format_payee_list;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::PayeeType;
use crate::services::PayeeService;
use crate::storage::Storage;

/// Payee subcommands
#[derive(Subcommand)]
pub enum PayeeCommands {
    /// List payees with usage statistics
    List,

    /// Create a payee
    Create {
        /// Payee name
        name: String,
        /// Mark the payee as generic (a kind of counterparty)
        #[arg(long)]
        generic: bool,
    },

    /// Rename a payee or change its type
    Update {
        /// Payee name or ID
        payee: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New type: Generic or Actual
        #[arg(short = 't', long = "type")]
        payee_type: Option<String>,
    },

    /// Delete a payee that no transaction uses
    Delete {
        /// Payee name or ID
        payee: String,
    },
}

fn payee_not_found(identifier: &str) -> MoneybagsError {
    MoneybagsError::payee_not_found(identifier)
}

/// Handle a payee command
pub async fn handle_payee_command(storage: &Storage, cmd: PayeeCommands) -> MoneybagsResult<()> {
    let service = PayeeService::new(storage);

    match cmd {
        PayeeCommands::List => {
            let payees = service.list_with_usage().await?;
            print!("{}", format_payee_list(&payees));
        }

        PayeeCommands::Create { name, generic } => {
            let payee_type = if generic { PayeeType::Generic } else { PayeeType::Actual };
            let payee = service.create(&name, payee_type).await?;
            println!("Created payee: {} ({})", payee.name, payee.payee_type);
        }

        PayeeCommands::Update {
            payee,
            name,
            payee_type,
        } => {
            let existing = service
                .find(&payee)
                .await?
                .ok_or_else(|| payee_not_found(&payee))?;
            let payee_type = payee_type
                .map(|t| t.parse::<PayeeType>())
                .transpose()
                .map_err(|e| MoneybagsError::Validation(e.to_string()))?;
            let name = name.unwrap_or_else(|| existing.name.clone());
            let updated = service.update(existing.id, &name, payee_type).await?;
            println!("Updated payee: {} ({})", updated.name, updated.payee_type);
        }

        PayeeCommands::Delete { payee } => {
            let existing = service
                .find(&payee)
                .await?
                .ok_or_else(|| payee_not_found(&payee))?;
            let deleted = service.delete(existing.id).await?;
            println!("Deleted payee: {}", deleted.name);
        }
    }

    Ok(())
}
