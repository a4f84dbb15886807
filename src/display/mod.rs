//! Display formatting for terminal output
//!
//! Tables for entity listings and text layouts for the reports.

pub mod report;
pub mod tables;

pub use report::{format_overview, format_trends, format_variance};
pub use tables::{
    format_category_list, format_payee_list, format_recent, format_template,
    format_transaction_list,
};
