//! JSON envelope and error mapping for the HTTP API
//!
//! Success bodies are `{"success": true, "data": ...}`; failures are
//! `{"success": false, "error": "...", "retryable": bool}`.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::error::MoneybagsError;

/// Seconds a client should wait before retrying a 503
const RETRY_AFTER_SECS: &str = "3";

/// A successful API payload
#[derive(Debug)]
pub struct ApiResponse<T>(pub T);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(json!({ "success": true, "data": self.0 })).into_response()
    }
}

/// A failed API call
#[derive(Debug)]
pub struct ApiError(pub MoneybagsError);

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

pub type ApiCreated<T> = Result<(StatusCode, ApiResponse<T>), ApiError>;

/// Shorthand for handlers returning a payload
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse(data))
}

/// A payload with `201 Created`
pub fn created<T: Serialize>(data: T) -> ApiCreated<T> {
    Ok((StatusCode::CREATED, ApiResponse(data)))
}

impl<E: Into<MoneybagsError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// HTTP status for an error
pub fn error_status(err: &MoneybagsError) -> StatusCode {
    match err {
        MoneybagsError::Validation(_) | MoneybagsError::Import(_) | MoneybagsError::Json(_) => {
            StatusCode::BAD_REQUEST
        }
        MoneybagsError::NotFound { .. } => StatusCode::NOT_FOUND,
        MoneybagsError::Duplicate { .. } | MoneybagsError::InUse(_) => StatusCode::CONFLICT,
        MoneybagsError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        let retryable = self.0.is_transient();
        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let body = Json(json!({
            "success": false,
            "error": self.0.to_string(),
            "retryable": retryable,
        }));
        let mut resp = (status, body).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            resp.headers_mut()
                .insert("retry-after", HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        resp
    }
}
