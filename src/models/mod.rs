//! Core data models for Moneybags
//!
//! Categories, payees, budget entries and templates, transactions,
//! configuration entries and supersaver savings, plus the amount and
//! calendar types they share.

pub mod budget;
pub mod category;
pub mod configuration;
pub mod ids;
pub mod money;
pub mod payee;
pub mod period;
pub mod supersaver;
pub mod transaction;

pub use budget::{BudgetEntry, BudgetTemplate};
pub use category::{Category, CategoryType};
pub use configuration::ConfigEntry;
pub use ids::{
    BudgetEntryId, CategoryId, ConfigEntryId, PayeeId, SupersaverCategoryId, SupersaverEntryId,
    TemplateId, TransactionId,
};
pub use money::{Amount, CurrencyFormat};
pub use payee::{Payee, PayeeType, PayeeUsage};
pub use period::{DateRange, YearMonth};
pub use supersaver::{
    SupersaverCategory, SupersaverCategorySummary, SupersaverEntry, SupersaverEntryDetail,
    SupersaverHeatmap, SupersaverSummary, SupersaverTrend,
};
pub use transaction::{Transaction, TransactionDetail, TransactionWithPayee};
