//! Error response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// Standard error response format: `{success: false, error, message, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    /// Machine readable error code
    #[schema(example = "VALIDATION_ERROR")]
    pub error: String,
    #[schema(example = "Validation failed")]
    pub message: String,
    /// Field-level validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationFieldError>>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: code.to_string(),
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<ValidationFieldError>) -> Self {
        self.errors = Some(errors);
        self
    }
}
