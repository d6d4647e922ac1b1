use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, email: String, expiration_hours: i64) -> Self {
        let now = Timestamp::now();
        let exp = now.as_second() + SignedDuration::from_hours(expiration_hours).as_secs();

        Self {
            sub: user_id.to_string(),
            email,
            iat: now.as_second(),
            exp,
        }
    }

    pub fn user_id(&self) -> AppResult<i32> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token."))
    }
}

/// Generates an HS256 token for a user
///
/// # Example
/// ```ignore
/// let token = generate_token(1, "user@example.com".to_string(), &settings.jwt.secret, 168)?;
/// ```
pub fn generate_token(
    user_id: i32,
    email: String,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::new(user_id, email, expiration_hours);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Validates and decodes a JWT token
///
/// Signature and expiry are checked; the subject still has to be resolved
/// to an active user by the caller.
pub fn validate_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized("Token expired."),
        _ => AppError::unauthorized("Invalid token."),
    })
}
