//! JWT authentication middleware.
//!
//! Validates the bearer token and resolves its subject to an active user.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::utils::jwt::validate_token;

/// Extension type for the authenticated user.
///
/// Added to request extensions after successful authentication and
/// extracted in handlers using `Extension<AuthUser>`. Handlers take the
/// caller's identity from here only, never from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

const NO_TOKEN: &str = "Access denied. No token provided.";

/// Token of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(NO_TOKEN))
}

/// JWT authentication middleware
///
/// # Errors
/// Returns 401 Unauthorized if the header is missing or malformed, the token
/// is invalid or expired, or its user no longer exists or is deactivated.
///
/// # Example
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = validate_token(token, &state.settings.jwt.secret)?;
    let user = state.services.users.authenticate(claims.user_id()?).await?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_or_malformed_header() {
        for result in [
            bearer_token(&HeaderMap::new()),
            bearer_token(&headers("Basic dXNlcjpwYXNz")),
            bearer_token(&headers("Bearer ")),
        ] {
            match result {
                Err(AppError::Unauthorized { message }) => assert_eq!(message, NO_TOKEN),
                other => panic!("Expected Unauthorized error, got {:?}", other),
            }
        }
    }
}
