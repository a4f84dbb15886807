//! Storage initialization
//!
//! Writes starter categories, payees, a template for the current year and
//! default configuration the first time a database is opened.

use tracing::info;

use crate::error::MoneybagsResult;
use crate::models::configuration::{CURRENCY_FORMAT_KEY, DATABASE_SEEDED_KEY};
use crate::models::{BudgetTemplate, Category, CategoryType, CurrencyFormat, Payee, PayeeType};

use super::{categories, configuration, payees, templates, Storage};

const DEFAULT_CATEGORIES: &[(&str, CategoryType)] = &[
    ("Salary", CategoryType::Income),
    ("Other income", CategoryType::Income),
    ("Housing & utilities", CategoryType::Expenses),
    ("Repairs & maintenance", CategoryType::Expenses),
    ("Digital services", CategoryType::Expenses),
    ("Cars", CategoryType::Expenses),
    ("Clothing & shopping", CategoryType::Expenses),
    ("Sports", CategoryType::Expenses),
    ("Travel", CategoryType::Expenses),
    ("Savings", CategoryType::Expenses),
];

const DEFAULT_PAYEES: &[(&str, PayeeType)] = &[
    ("Employer", PayeeType::Actual),
    ("Landlord", PayeeType::Generic),
    ("Power Company", PayeeType::Generic),
    ("Netflix", PayeeType::Actual),
    ("Spotify", PayeeType::Actual),
];

/// Seed an empty database. Returns `false` when it was seeded before.
pub async fn seed_defaults(storage: &Storage, year: i32) -> MoneybagsResult<bool> {
    let mut tx = storage.begin().await?;

    if configuration::get(&mut tx, DATABASE_SEEDED_KEY).await?.is_some() {
        return Ok(false);
    }

    let mut created_categories = 0;
    for (name, category_type) in DEFAULT_CATEGORIES {
        if categories::get_by_name(&mut tx, name).await?.is_some() {
            continue;
        }
        let category = Category::new(*name, *category_type);
        categories::insert(&mut tx, &category).await?;
        templates::insert(&mut tx, &BudgetTemplate::new(year, category.id)).await?;
        created_categories += 1;
    }

    for (name, payee_type) in DEFAULT_PAYEES {
        if payees::get_by_name(&mut tx, name).await?.is_none() {
            payees::insert(&mut tx, &Payee::new(*name, *payee_type)).await?;
        }
    }

    if configuration::get(&mut tx, CURRENCY_FORMAT_KEY).await?.is_none() {
        configuration::set(&mut tx, CURRENCY_FORMAT_KEY, CurrencyFormat::default().as_str()).await?;
    }
    configuration::set(&mut tx, DATABASE_SEEDED_KEY, "true").await?;

    tx.commit().await?;
    storage.config_cache().invalidate();

    info!(categories = created_categories, year, "seeded starter data");
    Ok(true)
}
