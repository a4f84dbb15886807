//! CLI commands for data export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::export::{
    export_budget_csv, export_full_json, export_full_yaml, export_transactions_csv, FullExport,
};
use crate::storage::Storage;

/// Full export format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// JSON format
    Json,
    /// YAML format, human-readable
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the whole database
    All {
        /// Output file path, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export transactions to CSV
    Transactions {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export budget entries to CSV
    Budget {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what an export would contain
    Info,
}

fn open_output(output: Option<&PathBuf>) -> MoneybagsResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                MoneybagsError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

fn report_written(output: Option<&PathBuf>, what: &str) {
    if let Some(path) = output {
        eprintln!("{} exported to: {}", what, path.display());
    }
}

/// Handle export commands
pub async fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> MoneybagsResult<()> {
    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = open_output(output.as_ref())?;
            match format {
                ExportFormat::Json => export_full_json(storage, &mut writer, pretty).await?,
                ExportFormat::Yaml => export_full_yaml(storage, &mut writer).await?,
            }
            writer.flush()?;
            report_written(output.as_ref(), "Full database");
        }
        ExportCommands::Transactions { output } => {
            let writer = open_output(output.as_ref())?;
            export_transactions_csv(storage, writer).await?;
            report_written(output.as_ref(), "Transactions");
        }
        ExportCommands::Budget { output } => {
            let writer = open_output(output.as_ref())?;
            export_budget_csv(storage, writer).await?;
            report_written(output.as_ref(), "Budget entries");
        }
        ExportCommands::Info => {
            let export = FullExport::from_storage(storage).await?;
            let meta = &export.metadata;
            println!("Export Information");
            println!("==================");
            println!("Schema version: {}", export.schema_version);
            println!("Categories:     {}", meta.category_count);
            println!("Payees:         {}", meta.payee_count);
            println!("Budget entries: {}", meta.budget_entry_count);
            println!("Transactions:   {}", meta.transaction_count);
            if let (Some(first), Some(last)) = (meta.earliest_transaction, meta.latest_transaction) {
                println!("Date range:     {} to {}", first, last);
            }
        }
    }

    Ok(())
}
