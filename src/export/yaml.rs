//! YAML Export functionality
//!
//! Exports the complete database to YAML format for human-readable backup.

use std::io::Write;

use crate::error::{MoneybagsError, MoneybagsResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

fn export_err(e: impl std::fmt::Display) -> MoneybagsError {
    MoneybagsError::Export(e.to_string())
}

/// Export the full database to YAML format
pub async fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> MoneybagsResult<()> {
    let export = FullExport::from_storage(storage).await?;

    writeln!(writer, "# Moneybags Full Database Export").map_err(export_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(export_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(export_err)?;
    writeln!(writer, "#").map_err(export_err)?;
    writeln!(writer, "# Keep it secure - it contains all your financial data.").map_err(export_err)?;
    writeln!(writer).map_err(export_err)?;

    serde_yaml::to_writer(writer, &export).map_err(export_err)?;
    Ok(())
}
