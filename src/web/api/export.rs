//! Export downloads

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::export::{export_budget_csv, export_full_json, export_full_yaml, export_transactions_csv};
use crate::web::response::ApiError;
use crate::web::AppState;

fn download(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn transactions_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut body = Vec::new();
    export_transactions_csv(&state.storage, &mut body).await?;
    Ok(download("text/csv; charset=utf-8", "transactions.csv", body))
}

pub async fn budget_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut body = Vec::new();
    export_budget_csv(&state.storage, &mut body).await?;
    Ok(download("text/csv; charset=utf-8", "budget.csv", body))
}

pub async fn full_json(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut body = Vec::new();
    export_full_json(&state.storage, &mut body, true).await?;
    Ok(download("application/json", "moneybags.json", body))
}

pub async fn full_yaml(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut body = Vec::new();
    export_full_yaml(&state.storage, &mut body).await?;
    Ok(download("application/yaml", "moneybags.yaml", body))
}
