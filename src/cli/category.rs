//! Category CLI commands

use clap::Subcommand;

use crate::display::format_category_list;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::models::{Category, CategoryType};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories with the years they are budgeted in
    List,

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// income or expenses
        #[arg(short = 't', long = "type", default_value = "expenses")]
        category_type: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Delete a category that has no budget entries or transactions
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Look up a category by name or ID
pub async fn resolve_category(storage: &Storage, identifier: &str) -> MoneybagsResult<Category> {
    CategoryService::new(storage)
        .find(identifier)
        .await?
        .ok_or_else(|| MoneybagsError::category_not_found(identifier))
}

/// Handle a category command
pub async fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> MoneybagsResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let items = service.list_with_usage().await?;
            print!("{}", format_category_list(&items));
        }

        CategoryCommands::Create { name, category_type } => {
            let category_type = category_type
                .parse::<CategoryType>()
                .map_err(|e| MoneybagsError::Validation(e.to_string()))?;
            let category = service.create(&name, category_type).await?;
            println!("Created category: {}", category.name);
            println!("  Type: {}", category.category_type);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Rename { category, name } => {
            let existing = resolve_category(storage, &category).await?;
            let renamed = service.rename(existing.id, &name).await?;
            println!("Renamed '{}' to '{}'", existing.name, renamed.name);
        }

        CategoryCommands::Delete { category } => {
            let existing = resolve_category(storage, &category).await?;
            let deleted = service.delete(existing.id).await?;
            println!("Deleted category: {}", deleted.name);
        }
    }

    Ok(())
}
