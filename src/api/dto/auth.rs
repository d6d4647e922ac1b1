//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::rules::validate_password_strength;
use crate::api::dto::user::{LocationRequest, UserResponse};
use crate::models::ExperienceLevel;

/// Register request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// User's email address (unique, case-insensitive)
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "jane@example.com", format = "email")]
    pub email: String,
    /// Plain text, hashed before storage
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom(function = "validate_password_strength")
    )]
    #[schema(example = "Secret123", format = "password", min_length = 6)]
    pub password: String,
    #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"))]
    #[schema(example = "Jane", min_length = 2, max_length = 50)]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"))]
    #[schema(example = "Doe", min_length = 2, max_length = 50)]
    pub last_name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience: Option<ExperienceLevel>,
    #[validate(nested)]
    pub location: Option<LocationRequest>,
    #[serde(default)]
    pub remote_preference: bool,
    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "jane@example.com", format = "email")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Secret123", format = "password")]
    pub password: String,
}

/// Issued token together with the authenticated user
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// HS256 signed JWT, send as `Authorization: Bearer <token>`
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(body: serde_json::Value) -> RegisterRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_registration() {
        let request = register(json!({
            "email": "jane@example.com",
            "password": "Secret123",
            "firstName": "Jane",
            "lastName": "Doe",
            "location": { "city": "Lisbon", "country": "Portugal" }
        }));
        assert!(request.validate().is_ok());
        assert!(!request.remote_preference);
        assert!(request.skills.is_empty());
    }

    #[test]
    fn test_weak_password_and_short_name() {
        let request = register(json!({
            "email": "not-an-email",
            "password": "secret",
            "firstName": "J",
            "lastName": "Doe"
        }));
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("first_name"));
        assert!(!fields.contains_key("last_name"));
    }

    #[test]
    fn test_login_requires_password() {
        let request: LoginRequest =
            serde_json::from_value(json!({ "email": "jane@example.com", "password": "" }))
                .unwrap();
        assert!(request.validate().is_err());
    }
}
