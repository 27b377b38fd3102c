//! Conversion of `AppError` and handler panics into HTTP responses.
//!
//! Every error body has the `ErrorResponse` shape. Server-side failures are
//! logged with their full source chain but answered with a generic message.

use std::any::Any;

use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::ErrorResponse;
use crate::error::AppError;

const GENERIC_SERVER_ERROR: &str = "An internal error occurred";

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::ValidationErrors { .. }
            | AppError::BadRequest { .. }
            | AppError::DuplicateEmail { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store { .. }
            | AppError::ConnectionPool { .. }
            | AppError::Configuration { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        match self {
            AppError::NotFound {
                entity,
                field,
                value,
            } => ErrorResponse::new("NOT_FOUND", &format!("{} not found", capitalize(entity)))
                .with_details(json!({ "entity": entity, "field": field, "value": value })),
            AppError::DuplicateEmail { .. } => {
                ErrorResponse::new("DUPLICATE_EMAIL", "Email already registered")
                    .with_details(json!({ "field": "email" }))
            }
            AppError::Validation { field, reason } => {
                ErrorResponse::new("VALIDATION_ERROR", reason)
                    .with_details(json!({ "field": field }))
            }
            AppError::ValidationErrors { errors } => {
                let fields: Vec<_> = errors
                    .iter()
                    .map(|e| json!({ "field": e.field, "message": e.message }))
                    .collect();
                ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(json!({ "errors": fields }))
            }
            AppError::BadRequest { message } => ErrorResponse::new("BAD_REQUEST", message),
            AppError::InvalidCredentials => {
                ErrorResponse::new("INVALID_CREDENTIALS", "Invalid credentials")
            }
            AppError::Unauthorized { message } => ErrorResponse::new("UNAUTHORIZED", message),
            AppError::Cancelled { .. } => {
                ErrorResponse::new("SERVICE_UNAVAILABLE", "Server is shutting down")
            }
            AppError::Store { .. } => ErrorResponse::new("DATABASE_ERROR", GENERIC_SERVER_ERROR),
            AppError::ConnectionPool { .. } => {
                ErrorResponse::new("DATABASE_UNAVAILABLE", GENERIC_SERVER_ERROR)
            }
            AppError::Configuration { .. } => {
                ErrorResponse::new("CONFIGURATION_ERROR", GENERIC_SERVER_ERROR)
            }
            AppError::Internal { .. } => ErrorResponse::new("INTERNAL_ERROR", GENERIC_SERVER_ERROR),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        error_response(status, self.to_error_response())
    }
}

/// The body is also stored as a response extension so the request ID
/// middleware can stamp `request_id` into it.
fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    let mut response = (status, Json(body.clone())).into_response();
    response.extensions_mut().insert(body);
    response
}

/// Response for a panic caught by `CatchPanicLayer`.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "Handler panicked");

    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new("INTERNAL_ERROR", GENERIC_SERVER_ERROR),
    )
}

/// Fallback for paths no route matches.
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        entity: "route".to_string(),
        field: "path".to_string(),
        value: uri.path().to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
