//! Configuration module for Moneybags
//!
//! - Platform path resolution
//! - Process settings persistence (database, bind address, logging)

pub mod paths;
pub mod settings;

pub use paths::MoneybagsPaths;
pub use settings::Settings;
