//! Error handler for converting AppError to HTTP responses.
//!
//! Implements `IntoResponse` for `AppError` so every failure leaves the API in
//! the `{success: false, error, message, errors?}` envelope, and provides a
//! global middleware that rewrites plain-text error bodies produced outside
//! the handlers (unknown routes, wrong methods, timeouts).

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::dto::ErrorResponse;
use crate::error::{AppError, ValidationFieldError};

/// Upper bound for error bodies read back by the global handler.
const MAX_ERROR_BODY: usize = 64 * 1024;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Maps an AppError variant to its HTTP status code.
///
/// Duplicates are a client mistake here (registering a taken email), so
/// they share 400 with the other input errors.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. }
        | AppError::Validation { .. }
        | AppError::ValidationErrors { .. }
        | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

fn error_body(error: &AppError) -> ErrorResponse {
    let code = error_to_code(error);
    match error {
        AppError::NotFound { entity, .. } => {
            ErrorResponse::new(code, format!("{} not found", capitalize(entity)))
        }
        AppError::Duplicate { entity, field, .. } => ErrorResponse::new(
            code,
            format!("{} with this {} already exists", capitalize(entity), field),
        ),
        AppError::Validation { field, reason } => ErrorResponse::new(code, "Validation failed")
            .with_errors(vec![ValidationFieldError {
                field: field.clone(),
                message: reason.clone(),
            }]),
        AppError::ValidationErrors { errors } => {
            ErrorResponse::new(code, "Validation failed").with_errors(errors.clone())
        }
        AppError::BadRequest { message }
        | AppError::Unauthorized { message }
        | AppError::Forbidden { message } => ErrorResponse::new(code, message.clone()),
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new(code, "Database connection unavailable")
        }
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            ErrorResponse::new(code, error.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, Json(error_body(&self))).into_response()
    }
}

/// Envelope for an error response that did not come from an `AppError`.
fn fallback_body(status: StatusCode, original: &str) -> ErrorResponse {
    let default = match status {
        StatusCode::BAD_REQUEST => "Bad request - invalid or malformed request",
        StatusCode::NOT_FOUND => "The requested resource was not found",
        StatusCode::METHOD_NOT_ALLOWED => "HTTP method not allowed for this endpoint",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported media type",
        StatusCode::REQUEST_TIMEOUT => "Request timeout",
        StatusCode::PAYLOAD_TOO_LARGE => "Request payload too large",
        StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable",
        s if s.is_server_error() => "An internal server error occurred",
        _ => "An unknown error occurred",
    };
    let code = status
        .canonical_reason()
        .map(|reason| reason.to_uppercase().replace([' ', '-'], "_"))
        .unwrap_or_else(|| "UNKNOWN_ERROR".to_string());
    let message = if original.is_empty() {
        default.to_string()
    } else {
        original.to_string()
    };

    ErrorResponse::new(&code, message)
}

/// Global error handling middleware.
///
/// Error responses that already carry JSON pass through untouched; anything
/// else is rewritten into the standard error envelope, keeping the original
/// text as the message when there is one.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .unwrap_or_default();
    let original = String::from_utf8_lossy(&bytes).trim().to_string();

    (status, Json(fallback_body(status, &original))).into_response()
}

/// Fallback for unmatched routes.
pub async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("NOT_FOUND", "Route not found")),
    )
        .into_response()
}
