//! Budget template CLI commands

use clap::Subcommand;

use super::category::resolve_category;
use crate::display::format_template;
use crate::error::MoneybagsResult;
use crate::services::TemplateService;
use crate::storage::Storage;

/// Template subcommands
#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Show the categories in a year's template
    Show {
        year: i32,
    },

    /// List the years that have a template
    Years,

    /// Add a category to a year's template
    Add {
        year: i32,
        /// Category name or ID
        category: String,
    },

    /// Remove a category from a year's template
    Remove {
        year: i32,
        /// Category name or ID
        category: String,
    },

    /// Copy one year's template into another
    Copy {
        from: i32,
        to: i32,
    },
}

/// Handle a template command
pub async fn handle_template_command(storage: &Storage, cmd: TemplateCommands) -> MoneybagsResult<()> {
    let service = TemplateService::new(storage);

    match cmd {
        TemplateCommands::Show { year } => {
            let categories = service.categories(year).await?;
            print!("{}", format_template(year, &categories));
        }
        TemplateCommands::Years => {
            let years = service.years().await?;
            if years.is_empty() {
                println!("No templates yet.");
            }
            for year in years {
                println!("{}", year);
            }
        }
        TemplateCommands::Add { year, category } => {
            let category = resolve_category(storage, &category).await?;
            service.add(year, category.id).await?;
            println!("Added '{}' to the {} template", category.name, year);
        }
        TemplateCommands::Remove { year, category } => {
            let category = resolve_category(storage, &category).await?;
            service.remove(year, category.id).await?;
            println!("Removed '{}' from the {} template", category.name, year);
        }
        TemplateCommands::Copy { from, to } => {
            let copied = service.copy(from, to).await?;
            println!("Copied {} categories from {} to {}", copied, from, to);
        }
    }

    Ok(())
}
