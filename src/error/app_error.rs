use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum_extra::extract::QueryRejection;
use diesel_async::pooled_connection::bb8::RunError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::error::DatabaseErrorConverter;

/// A single field that failed request validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationFieldError {
    #[schema(example = "email")]
    pub field: String,
    #[schema(example = "Please provide a valid email")]
    pub message: String,
}

/// Application-wide error type that represents all possible errors in the system.
///
/// Services, repositories and handlers all return [`AppResult`]; the HTTP
/// mapping lives in `api::middleware::error_handler`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Duplicate entry error for unique constraint violations
    #[error("Duplicate entry: {entity}.{field} = '{value}' already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Several request fields failed validation at once
    #[error("Validation failed")]
    ValidationErrors { errors: Vec<ValidationFieldError> },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity: entity.to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(error: crate::config::ConfigError) -> Self {
        AppError::Configuration {
            key: match &error {
                crate::config::ConfigError::ValidationError { field, .. } => field.clone(),
                _ => "settings".to_string(),
            },
            source: anyhow::Error::new(error),
        }
    }
}

impl From<RunError> for AppError {
    fn from(error: RunError) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::new(error),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(format!("Failed to deserialize query string: {rejection}"))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_field_errors(&errors, None, &mut fields);
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationErrors { errors: fields }
    }
}

fn collect_field_errors(
    errors: &ValidationErrors,
    prefix: Option<&str>,
    out: &mut Vec<ValidationFieldError>,
) {
    let kinds: &HashMap<Cow<'static, str>, ValidationErrorsKind> = errors.errors();
    for (name, kind) in kinds {
        let field = match prefix {
            Some(prefix) => format!("{prefix}.{}", camel_case(name)),
            None => camel_case(name),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| ValidationFieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
                }));
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_field_errors(nested, Some(&field), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, Some(&format!("{field}[{index}]")), out);
                }
            }
        }
    }
}

/// Request bodies are camelCase on the wire; validator reports Rust names.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    struct Preferences {
        #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
        currency: String,
    }

    #[derive(Validate)]
    struct Profile {
        #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"))]
        first_name: String,
        #[validate(email)]
        email: String,
        #[validate(nested)]
        preferences: Preferences,
    }

    #[test]
    fn test_validation_errors_are_flattened_and_camel_cased() {
        let profile = Profile {
            first_name: "A".into(),
            email: "nope".into(),
            preferences: Preferences {
                currency: "EURO".into(),
            },
        };

        let AppError::ValidationErrors { errors } = AppError::from(profile.validate().unwrap_err())
        else {
            panic!("expected ValidationErrors");
        };

        assert_eq!(
            errors,
            vec![
                ValidationFieldError {
                    field: "email".into(),
                    message: "Invalid value (email)".into(),
                },
                ValidationFieldError {
                    field: "firstName".into(),
                    message: "First name must be between 2 and 50 characters".into(),
                },
                ValidationFieldError {
                    field: "preferences.currency".into(),
                    message: "Currency must be a 3-letter code".into(),
                },
            ]
        );
    }

    #[test]
    fn test_custom_validation_error_message() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "new_password",
            ValidationError::new("weak").with_message("Too weak".into()),
        );

        let AppError::ValidationErrors { errors } = AppError::from(errors) else {
            panic!("expected ValidationErrors");
        };
        assert_eq!(errors[0].field, "newPassword");
        assert_eq!(errors[0].message, "Too weak");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("salary_min"), "salaryMin");
        assert_eq!(camel_case("remote"), "remote");
        assert_eq!(camel_case("exclude_keywords"), "excludeKeywords");
    }
}
