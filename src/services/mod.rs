//! Service layer for Moneybags
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, lifecycle guards, and cross-entity operations.

pub mod budget;
pub mod category;
pub mod configuration;
pub mod dashboard;
pub mod import;
pub mod payee;
pub mod supersaver;
pub mod template;
pub mod transaction;

pub use budget::BudgetService;
pub use category::CategoryService;
pub use configuration::ConfigurationService;
pub use dashboard::DashboardService;
pub use import::ImportService;
pub use payee::PayeeService;
pub use supersaver::SupersaverService;
pub use template::TemplateService;
pub use transaction::TransactionService;
