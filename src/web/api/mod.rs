//! JSON API routes

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod export;
pub mod import;
pub mod ledger;
pub mod supersaver;

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/categories/:id",
            put(catalog::rename_category).delete(catalog::delete_category),
        )
        .route("/api/payees", get(catalog::list_payees).post(catalog::create_payee))
        .route(
            "/api/payees/:id",
            put(catalog::update_payee).delete(catalog::delete_payee),
        )
        .route("/api/years", get(catalog::list_years))
        .route("/api/templates/copy", post(catalog::copy_template))
        .route(
            "/api/templates/:year",
            get(catalog::get_template).post(catalog::add_to_template),
        )
        .route(
            "/api/templates/:year/:category_id",
            delete(catalog::remove_from_template),
        )
        .route("/api/budget/:year", get(ledger::budget_year))
        .route("/api/budget-entries", post(ledger::save_budget_entry))
        .route("/api/budget-entries/:id", delete(ledger::delete_budget_entry))
        .route(
            "/api/transactions",
            get(ledger::list_transactions).post(ledger::create_transaction),
        )
        .route(
            "/api/transactions/:id",
            put(ledger::update_transaction).delete(ledger::delete_transaction),
        )
        .route("/api/analysis/overview/:year", get(analysis::overview))
        .route(
            "/api/analysis/trends/:year/:category_id",
            get(analysis::trends),
        )
        .route(
            "/api/analysis/variance/:year/:month/:category_id",
            get(analysis::variance),
        )
        .route("/api/dashboard/recurring", get(analysis::recurring))
        .route("/api/dashboard/recent", get(analysis::recent))
        .route("/api/dashboard/summary", get(analysis::summary))
        .route("/api/dashboard/monitored", get(analysis::monitored))
        .route("/api/config", get(config::get_config).put(config::update_config))
        .route(
            "/api/config/database",
            get(config::get_database).put(config::update_database),
        )
        .route("/api/config/database/test", post(config::test_database))
        .route("/api/import/parse", post(import::parse))
        .route("/api/import/validate", post(import::validate))
        .route("/api/import/execute", post(import::execute))
        .route("/api/export/transactions.csv", get(export::transactions_csv))
        .route("/api/export/budget.csv", get(export::budget_csv))
        .route("/api/export/full.json", get(export::full_json))
        .route("/api/export/full.yaml", get(export::full_yaml))
        .route(
            "/api/supersaver/categories",
            get(supersaver::list_categories).post(supersaver::create_category),
        )
        .route(
            "/api/supersaver/categories/:id",
            put(supersaver::rename_category).delete(supersaver::delete_category),
        )
        .route(
            "/api/supersaver/categories/:id/balance",
            get(supersaver::balance),
        )
        .route(
            "/api/supersaver/categories/:id/entries/:year/:month",
            get(supersaver::month_entries),
        )
        .route("/api/supersaver/entries", post(supersaver::create_entry))
        .route(
            "/api/supersaver/entries/:id",
            put(supersaver::update_entry).delete(supersaver::delete_entry),
        )
        .route("/api/supersaver/heatmap", get(supersaver::heatmap_current_year))
        .route("/api/supersaver/heatmap/:year", get(supersaver::heatmap))
        .route("/api/supersaver/summary", get(supersaver::summary))
}
