//! HTTP front end
//!
//! An axum router serving the JSON API under `/api`, server-rendered pages
//! and the HTML fragments those pages load.

pub mod api;
pub mod extract;
pub mod middleware;
pub mod pages;
pub mod response;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::paths::MoneybagsPaths;
use crate::config::settings::Settings;
use crate::error::{MoneybagsError, MoneybagsResult};
use crate::storage::Storage;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    /// Settings as loaded at startup; database edits are saved to disk and
    /// apply on the next start
    pub settings: Arc<RwLock<Settings>>,
    pub paths: Arc<MoneybagsPaths>,
}

impl AppState {
    pub fn new(storage: Storage, settings: Settings, paths: MoneybagsPaths) -> Self {
        Self {
            storage,
            settings: Arc::new(RwLock::new(settings)),
            paths: Arc::new(paths),
        }
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(api::routes())
        .merge(pages::routes())
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Bind and serve until the process is stopped
pub async fn run_server(state: AppState, bind: &str) -> MoneybagsResult<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| MoneybagsError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
