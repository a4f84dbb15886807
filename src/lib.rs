//! Moneybags - single-user personal finance web application
//!
//! Budgets per category and month, actual transactions against them, and
//! reports comparing the two. The same services back a JSON API, a set of
//! server-rendered pages and a command line interface.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths and process settings
//! - `error`: Custom error types
//! - `models`: Core data models (categories, payees, budget entries, transactions)
//! - `storage`: SQLite storage layer
//! - `services`: Business logic layer
//! - `reports`: Budget against actual aggregation
//! - `import`: Spreadsheet parsing and formula evaluation
//! - `export`: CSV, JSON and YAML export
//! - `web`: HTTP API and pages
//! - `cli`, `display`: Command line handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use moneybags::config::{MoneybagsPaths, Settings};
//! use moneybags::storage::Storage;
//!
//! let paths = MoneybagsPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::connect(&settings.database.resolved_url(&paths), &settings.database).await?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;
pub mod web;

pub use error::{MoneybagsError, MoneybagsResult};
