//! Configuration endpoints

use std::collections::BTreeMap;

use axum::extract::State;
use tracing::info;

use crate::services::configuration::{test_connection, ConnectionTest, DatabaseConfig};
use crate::services::ConfigurationService;
use crate::web::extract::Json;
use crate::web::response::{ok, ApiResult};
use crate::web::AppState;

pub async fn get_config(State(state): State<AppState>) -> ApiResult<BTreeMap<String, String>> {
    ok(ConfigurationService::new(&state.storage).get_all().await?)
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(body): Json<BTreeMap<String, String>>,
) -> ApiResult<BTreeMap<String, String>> {
    ok(ConfigurationService::new(&state.storage).update(body).await?)
}

pub async fn get_database(State(state): State<AppState>) -> ApiResult<DatabaseConfig> {
    let settings = state.settings.read().await;
    ok(DatabaseConfig::from(&settings.database))
}

/// Save new database settings; they are used from the next start
pub async fn update_database(
    State(state): State<AppState>,
    Json(body): Json<DatabaseConfig>,
) -> ApiResult<DatabaseConfig> {
    let database = body.into_settings()?;

    let mut settings = state.settings.write().await;
    settings.database = database;
    settings.save(&state.paths)?;
    info!(pool_size = settings.database.pool_size, "saved database settings");

    ok(DatabaseConfig::from(&settings.database))
}

pub async fn test_database(
    State(state): State<AppState>,
    Json(body): Json<DatabaseConfig>,
) -> ApiResult<ConnectionTest> {
    let database = body.into_settings()?;
    let url = database.resolved_url(&state.paths);
    ok(test_connection(&url, &database).await)
}
