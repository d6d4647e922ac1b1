//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers::{alerts, health, jobs, search, users};
use crate::api::middleware::{
    auth_middleware, global_error_handler, logging_middleware, not_found_handler,
    request_id_middleware, timeout_middleware,
};
use crate::config::CorsConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Every documented route, with the auth layer on the protected groups.
fn api_router(state: &AppState) -> OpenApiRouter<AppState> {
    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let job_routes = jobs::public_job_routes()
        .merge(jobs::protected_job_routes().route_layer(auth.clone()));
    let user_routes = users::public_user_routes().merge(
        users::protected_user_routes()
            .nest("/alerts", alerts::alert_routes())
            .route_layer(auth),
    );

    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(health::health_routes())
        .nest("/api/jobs", job_routes)
        .nest("/api/search", search::search_routes())
        .nest("/api/users", user_routes)
}

fn cors_layer(config: &CorsConfig) -> AppResult<CorsLayer> {
    let origin = HeaderValue::from_str(config.allowed_origin.trim()).map_err(|e| {
        AppError::Configuration {
            key: "cors.allowed_origin".to_string(),
            source: anyhow::Error::new(e),
        }
    })?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. CORS and compression wrap everything
/// 2. Request ID, so every log line below carries it
/// 3. Logging
/// 4. Global error handler, which turns plain-text rejections into the
///    JSON error envelope
/// 5. Request deadline
///
/// # Routes
/// - `/health` - Health check
/// - `/api/jobs` - Listings, search, saved and applied jobs
/// - `/api/search` - Relevance search, trending skills, filter values
/// - `/api/users` - Accounts, profile and alerts
/// - `/swagger-ui` - Interactive API documentation
pub fn create_router(state: AppState) -> AppResult<Router> {
    let cors = cors_layer(&state.settings.cors)?;
    let (router, openapi) = api_router(&state).split_for_parts();

    let router = router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            timeout_middleware,
        ))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state);

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::config::validation::tests::valid_settings;
    use diesel_async::AsyncPgConnection;
    use diesel_async::pooled_connection::AsyncDieselConnectionManager;
    use diesel_async::pooled_connection::bb8::Pool;
    use std::sync::Arc;
    use utoipa::openapi::PathItem;

    fn test_state() -> AppState {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new("postgres://localhost/jobhub");
        let pool = Pool::builder().build_unchecked(manager);
        AppState::new(pool, CacheManager::disabled(), Arc::new(valid_settings()))
    }

    fn path<'a>(openapi: &'a utoipa::openapi::OpenApi, path: &str) -> &'a PathItem {
        openapi
            .paths
            .paths
            .get(path)
            .unwrap_or_else(|| panic!("{path} is not documented"))
    }

    #[tokio::test]
    async fn test_routes_are_documented_under_their_prefixes() {
        let (_, openapi) = api_router(&test_state()).split_for_parts();

        for route in [
            "/health",
            "/api/jobs",
            "/api/jobs/search",
            "/api/jobs/skills/{skills}",
            "/api/jobs/{id}/save",
            "/api/jobs/{id}/application-status",
            "/api/search",
            "/api/search/trending",
            "/api/search/filters",
            "/api/users/register",
            "/api/users/jobs/applied",
            "/api/users/alerts",
            "/api/users/alerts/{id}/matches",
        ] {
            path(&openapi, route);
        }

        let save = path(&openapi, "/api/jobs/{id}/save");
        assert!(save.post.is_some());
        assert!(save.delete.is_some());
    }

    #[tokio::test]
    async fn test_only_protected_routes_require_a_token() {
        let (_, openapi) = api_router(&test_state()).split_for_parts();

        let listing = path(&openapi, "/api/jobs").get.as_ref().unwrap();
        assert!(listing.security.is_none());

        for public in ["/api/search", "/api/search/trending", "/api/search/filters"] {
            assert!(path(&openapi, public).get.as_ref().unwrap().security.is_none());
        }

        let profile = path(&openapi, "/api/users/profile").get.as_ref().unwrap();
        assert!(profile.security.is_some());

        let components = openapi.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearerAuth"));
    }

    #[tokio::test]
    async fn test_router_builds_with_valid_settings() {
        assert!(create_router(test_state()).is_ok());
    }

    #[test]
    fn test_cors_rejects_unparseable_origin() {
        let config = CorsConfig {
            allowed_origin: "http://bad\norigin".to_string(),
        };
        assert!(matches!(
            cors_layer(&config),
            Err(AppError::Configuration { .. })
        ));
    }
}
