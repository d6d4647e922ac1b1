//! Account handlers: registration, login and the caller's own profile.

use axum::{Extension, Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{
    ApiResponse, AppliedJobResponse, ApplicationsQuery, AuthResponse, ChangePasswordRequest,
    DeactivateRequest, LoginRequest, PageQuery, RegisterRequest, SavedJobResponse,
    UpdatePreferencesRequest, UpdateProfileRequest, UserResponse, UserStatsResponse,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the account routes that issue tokens
///
/// # Routes
/// - `POST /register` - Create an account and get a token
/// - `POST /login` - Exchange credentials for a token
pub fn public_user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
}

/// Routes scoped to the token's user.
pub fn protected_user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_profile, update_profile))
        .routes(routes!(change_password))
        .routes(routes!(update_preferences))
        .routes(routes!(user_stats))
        .routes(routes!(saved_jobs))
        .routes(routes!(applied_jobs))
        .routes(routes!(deactivate))
}

/// POST /api/users/register - Register new user
#[utoipa::path(
    post,
    path = "/register",
    tag = USER_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid data or email already registered")
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let auth = state.services.users.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(auth).with_message("User registered successfully")),
    ))
}

/// POST /api/users/login - Authenticate user
#[utoipa::path(
    post,
    path = "/login",
    tag = USER_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials or deactivated account")
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let auth = state.services.users.login(payload).await?;
    Ok(Json(ApiResponse::ok(auth).with_message("Login successful")))
}

/// GET /api/users/profile - Current user's profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = USER_TAG,
    responses(
        (status = 200, description = "Profile", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let (user, hit) = state.services.users.profile(auth_user.user_id).await?;
    Ok(Json(ApiResponse::ok(user).from_cache(hit)))
}

/// PUT /api/users/profile - Update profile fields
#[utoipa::path(
    put,
    path = "/profile",
    tag = USER_TAG,
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid profile data")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .services
        .users
        .update_profile(auth_user.user_id, payload)
        .await?;
    Ok(Json(
        ApiResponse::ok(user).with_message("Profile updated successfully"),
    ))
}

/// PUT /api/users/password - Change password
#[utoipa::path(
    put,
    path = "/password",
    tag = USER_TAG,
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully"),
        (status = 400, description = "Current password is incorrect or new one too weak")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .users
        .change_password(auth_user.user_id, payload)
        .await?;
    Ok(Json(ApiResponse::message("Password changed successfully")))
}

/// PUT /api/users/preferences - Merge job preferences
#[utoipa::path(
    put,
    path = "/preferences",
    tag = USER_TAG,
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid preferences")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_preferences(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<UpdatePreferencesRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .services
        .users
        .update_preferences(auth_user.user_id, payload)
        .await?;
    Ok(Json(
        ApiResponse::ok(user).with_message("Preferences updated successfully"),
    ))
}

/// GET /api/users/stats - Saved, applied and alert counts
#[utoipa::path(
    get,
    path = "/stats",
    tag = USER_TAG,
    responses(
        (status = 200, description = "User statistics", body = ApiResponse<UserStatsResponse>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn user_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<UserStatsResponse>>> {
    let (stats, hit) = state.services.users.stats(auth_user.user_id).await?;
    Ok(Json(ApiResponse::ok(stats).from_cache(hit)))
}

/// GET /api/users/jobs/saved - Saved jobs, most recent first
#[utoipa::path(
    get,
    path = "/jobs/saved",
    tag = USER_TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of saved jobs", body = ApiResponse<Vec<SavedJobResponse>>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn saved_jobs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<SavedJobResponse>>>> {
    let (page, hit) = state
        .services
        .user_jobs
        .saved(auth_user.user_id, query.page())
        .await?;
    Ok(Json(ApiResponse::from(page).from_cache(hit)))
}

/// GET /api/users/jobs/applied - Applications, optionally by status
#[utoipa::path(
    get,
    path = "/jobs/applied",
    tag = USER_TAG,
    params(ApplicationsQuery),
    responses(
        (status = 200, description = "Page of applications", body = ApiResponse<Vec<AppliedJobResponse>>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn applied_jobs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<ApplicationsQuery>,
) -> AppResult<Json<ApiResponse<Vec<AppliedJobResponse>>>> {
    let (page, hit) = state
        .services
        .user_jobs
        .applied(auth_user.user_id, query.status, query.page())
        .await?;
    Ok(Json(ApiResponse::from(page).from_cache(hit)))
}

/// POST /api/users/deactivate - Deactivate the account
#[utoipa::path(
    post,
    path = "/deactivate",
    tag = USER_TAG,
    request_body = DeactivateRequest,
    responses(
        (status = 200, description = "Account deactivated successfully"),
        (status = 400, description = "Password is incorrect")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn deactivate(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<DeactivateRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .users
        .deactivate(auth_user.user_id, payload)
        .await?;
    Ok(Json(ApiResponse::message("Account deactivated successfully")))
}
