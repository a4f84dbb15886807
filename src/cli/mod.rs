//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod category;
pub mod export;
pub mod import;
pub mod payee;
pub mod report;
pub mod template;
pub mod transaction;

pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use export::{handle_export_command, ExportCommands};
pub use import::{handle_import_command, ImportArgs};
pub use payee::{handle_payee_command, PayeeCommands};
pub use report::{handle_report_command, ReportCommands};
pub use template::{handle_template_command, TemplateCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
