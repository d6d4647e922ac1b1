//! Job alert (saved search) handlers, scoped to the token's user.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::ALERT_TAG;
use crate::api::dto::{
    AlertResponse, ApiResponse, CreateAlertRequest, JobResponse, PageQuery, UpdateAlertRequest,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates alert routes, mounted under `/api/users/alerts`.
///
/// # Routes
/// - `GET /` / `POST /` - List or create alerts
/// - `GET|PUT|DELETE /{id}` - Read, update or delete one alert
/// - `GET /{id}/matches` - Jobs currently matching the alert
pub fn alert_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_alerts, create_alert))
        .routes(routes!(get_alert, update_alert, delete_alert))
        .routes(routes!(alert_matches))
}

/// GET /api/users/alerts - List the caller's alerts
#[utoipa::path(
    get,
    path = "/",
    tag = ALERT_TAG,
    responses(
        (status = 200, description = "Alerts, newest first", body = ApiResponse<Vec<AlertResponse>>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn list_alerts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<Vec<AlertResponse>>>> {
    let alerts = state.services.alerts.list(auth_user.user_id).await?;
    Ok(Json(ApiResponse::ok(alerts)))
}

/// POST /api/users/alerts - Create an alert
#[utoipa::path(
    post,
    path = "/",
    tag = ALERT_TAG,
    request_body = CreateAlertRequest,
    responses(
        (status = 201, description = "Alert created", body = ApiResponse<AlertResponse>),
        (status = 400, description = "Invalid alert")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn create_alert(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateAlertRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AlertResponse>>)> {
    let alert = state.services.alerts.create(auth_user.user_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(alert).with_message("Alert created successfully")),
    ))
}

/// GET /api/users/alerts/{id} - One alert
#[utoipa::path(
    get,
    path = "/{id}",
    tag = ALERT_TAG,
    params(
        ("id" = i32, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "Alert found", body = ApiResponse<AlertResponse>),
        (status = 404, description = "Alert not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_alert(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<AlertResponse>>> {
    let alert = state.services.alerts.get(auth_user.user_id, id).await?;
    Ok(Json(ApiResponse::ok(alert)))
}

/// PUT /api/users/alerts/{id} - Update an alert
#[utoipa::path(
    put,
    path = "/{id}",
    tag = ALERT_TAG,
    params(
        ("id" = i32, Path, description = "Alert ID")
    ),
    request_body = UpdateAlertRequest,
    responses(
        (status = 200, description = "Alert updated", body = ApiResponse<AlertResponse>),
        (status = 404, description = "Alert not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_alert(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateAlertRequest>,
) -> AppResult<Json<ApiResponse<AlertResponse>>> {
    let alert = state
        .services
        .alerts
        .update(auth_user.user_id, id, req)
        .await?;
    Ok(Json(
        ApiResponse::ok(alert).with_message("Alert updated successfully"),
    ))
}

/// DELETE /api/users/alerts/{id} - Delete an alert
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = ALERT_TAG,
    params(
        ("id" = i32, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "Alert deleted"),
        (status = 404, description = "Alert not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn delete_alert(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.alerts.delete(auth_user.user_id, id).await?;
    Ok(Json(ApiResponse::message("Alert deleted successfully")))
}

/// GET /api/users/alerts/{id}/matches - Active jobs matching the criteria
#[utoipa::path(
    get,
    path = "/{id}/matches",
    tag = ALERT_TAG,
    params(
        ("id" = i32, Path, description = "Alert ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Page of matching jobs", body = ApiResponse<Vec<JobResponse>>),
        (status = 404, description = "Alert not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn alert_matches(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let page = state
        .services
        .alerts
        .matches(auth_user.user_id, id, query.page())
        .await?;
    Ok(Json(ApiResponse::from(page)))
}
