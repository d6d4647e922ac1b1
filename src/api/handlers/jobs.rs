//! Job listing, search and per-user job tracking handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::JOB_TAG;
use crate::api::dto::{
    ApiResponse, ApplicationStatusRequest, JobListQuery, JobNotesRequest, JobResponse,
    JobStatsResponse, JobStatusResponse, PageQuery, SearchRequest, SimilarQuery, SuggestionQuery,
    UserJobEntryResponse,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Routes readable without a token.
///
/// # Routes
/// - `GET /` - Filtered, sorted, paginated listing
/// - `GET /stats` - Aggregate statistics
/// - `GET /suggestions` - Title suggestions
/// - `GET /skills/{skills}` - Jobs requiring any of the listed skills
/// - `GET /remote` - Remote jobs
/// - `GET /{id}` - Job detail
/// - `GET /{id}/similar` - Jobs sharing a skill or the company
pub fn public_job_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_jobs))
        .routes(routes!(job_stats))
        .routes(routes!(job_suggestions))
        .routes(routes!(jobs_by_skills))
        .routes(routes!(remote_jobs))
        .routes(routes!(get_job))
        .routes(routes!(similar_jobs))
}

/// Routes that act on behalf of the authenticated user.
pub fn protected_job_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(search_jobs))
        .routes(routes!(save_job, unsave_job))
        .routes(routes!(apply_to_job))
        .routes(routes!(update_application_status))
        .routes(routes!(job_status))
}

/// GET /api/jobs - List active jobs
#[utoipa::path(
    get,
    path = "/",
    tag = JOB_TAG,
    params(JobListQuery),
    responses(
        (status = 200, description = "Page of jobs", body = ApiResponse<Vec<JobResponse>>),
        (status = 400, description = "Invalid query parameters")
    )
)]
async fn list_jobs(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<JobListQuery>,
) -> AppResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let (page, hit) = state
        .services
        .jobs
        .list(query.filter(), query.sort(), query.page())
        .await?;
    Ok(Json(ApiResponse::from(page).from_cache(hit)))
}

/// GET /api/jobs/stats - Totals, average salary, top skills and companies
#[utoipa::path(
    get,
    path = "/stats",
    tag = JOB_TAG,
    responses(
        (status = 200, description = "Job statistics", body = ApiResponse<JobStatsResponse>)
    )
)]
async fn job_stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<JobStatsResponse>>> {
    let (stats, hit) = state.services.jobs.stats().await?;
    Ok(Json(ApiResponse::ok(stats).from_cache(hit)))
}

/// GET /api/jobs/suggestions - Distinct titles matching `q`
#[utoipa::path(
    get,
    path = "/suggestions",
    tag = JOB_TAG,
    params(SuggestionQuery),
    responses(
        (status = 200, description = "Up to ten job titles", body = ApiResponse<Vec<String>>)
    )
)]
async fn job_suggestions(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SuggestionQuery>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let q = query.q.as_deref().unwrap_or_default();
    let (titles, hit) = state.services.jobs.suggestions(q).await?;
    Ok(Json(ApiResponse::ok(titles).from_cache(hit)))
}

/// GET /api/jobs/skills/{skills} - Jobs requiring any of the comma-separated skills
#[utoipa::path(
    get,
    path = "/skills/{skills}",
    tag = JOB_TAG,
    params(
        ("skills" = String, Path, description = "Comma-separated skills", example = "rust,tokio"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Page of jobs", body = ApiResponse<Vec<JobResponse>>),
        (status = 400, description = "No skill given")
    )
)]
async fn jobs_by_skills(
    State(state): State<AppState>,
    Path(skills): Path<String>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let (page, hit) = state.services.jobs.by_skills(&skills, query.page()).await?;
    Ok(Json(ApiResponse::from(page).from_cache(hit)))
}

/// GET /api/jobs/remote - Remote jobs
#[utoipa::path(
    get,
    path = "/remote",
    tag = JOB_TAG,
    params(PageQuery),
    responses(
        (status = 200, description = "Page of remote jobs", body = ApiResponse<Vec<JobResponse>>)
    )
)]
async fn remote_jobs(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let (page, hit) = state.services.jobs.remote(query.page()).await?;
    Ok(Json(ApiResponse::from(page).from_cache(hit)))
}

/// GET /api/jobs/{id} - Job detail, counts a view
#[utoipa::path(
    get,
    path = "/{id}",
    tag = JOB_TAG,
    params(
        ("id" = i32, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = ApiResponse<JobResponse>),
        (status = 404, description = "Job not found or inactive")
    )
)]
async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<JobResponse>>> {
    let (job, hit) = state.services.jobs.get(id).await?;
    Ok(Json(ApiResponse::ok(job).from_cache(hit)))
}

/// GET /api/jobs/{id}/similar - Jobs sharing a skill or the company
#[utoipa::path(
    get,
    path = "/{id}/similar",
    tag = JOB_TAG,
    params(
        ("id" = i32, Path, description = "Job ID"),
        SimilarQuery
    ),
    responses(
        (status = 200, description = "Similar jobs, newest first", body = ApiResponse<Vec<JobResponse>>),
        (status = 404, description = "Job not found or inactive")
    )
)]
async fn similar_jobs(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<SimilarQuery>,
) -> AppResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let (jobs, hit) = state.services.jobs.similar(id, query.limit).await?;
    Ok(Json(ApiResponse::ok(jobs).from_cache(hit)))
}

/// POST /api/jobs/search - Structured search
#[utoipa::path(
    post,
    path = "/search",
    tag = JOB_TAG,
    params(PageQuery),
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Page of matching jobs", body = ApiResponse<Vec<JobResponse>>),
        (status = 400, description = "Invalid search criteria"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn search_jobs(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
    ValidatedJson(req): ValidatedJson<SearchRequest>,
) -> AppResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let (page, hit) = state
        .services
        .jobs
        .search(req.filter(), req.sort(), query.page())
        .await?;
    Ok(Json(ApiResponse::from(page).from_cache(hit)))
}

/// POST /api/jobs/{id}/save - Save a job, updating notes when already saved
#[utoipa::path(
    post,
    path = "/{id}/save",
    tag = JOB_TAG,
    params(
        ("id" = i32, Path, description = "Job ID")
    ),
    request_body = JobNotesRequest,
    responses(
        (status = 201, description = "Job saved", body = ApiResponse<UserJobEntryResponse>),
        (status = 200, description = "Saved entry updated", body = ApiResponse<UserJobEntryResponse>),
        (status = 404, description = "Job not found or inactive")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn save_job(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<JobNotesRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserJobEntryResponse>>)> {
    let (entry, created) = state
        .services
        .user_jobs
        .save(auth_user.user_id, id, req.notes)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApiResponse::ok(entry).with_message("Job saved successfully")),
    ))
}

/// DELETE /api/jobs/{id}/save - Remove a job from the saved list
#[utoipa::path(
    delete,
    path = "/{id}/save",
    tag = JOB_TAG,
    params(
        ("id" = i32, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job no longer saved")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn unsave_job(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.user_jobs.unsave(auth_user.user_id, id).await?;
    Ok(Json(ApiResponse::message("Job removed from saved jobs")))
}

/// POST /api/jobs/{id}/apply - Record an application
#[utoipa::path(
    post,
    path = "/{id}/apply",
    tag = JOB_TAG,
    params(
        ("id" = i32, Path, description = "Job ID")
    ),
    request_body = JobNotesRequest,
    responses(
        (status = 201, description = "Application recorded", body = ApiResponse<UserJobEntryResponse>),
        (status = 400, description = "Already applied for this job"),
        (status = 404, description = "Job not found or inactive")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn apply_to_job(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<JobNotesRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserJobEntryResponse>>)> {
    let entry = state
        .services
        .user_jobs
        .apply(auth_user.user_id, id, req.notes)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(entry).with_message("Application submitted successfully")),
    ))
}

/// PUT /api/jobs/{id}/application-status - Move an application along
#[utoipa::path(
    put,
    path = "/{id}/application-status",
    tag = JOB_TAG,
    params(
        ("id" = i32, Path, description = "Job ID")
    ),
    request_body = ApplicationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<UserJobEntryResponse>),
        (status = 404, description = "No application for this job")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn update_application_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<ApplicationStatusRequest>,
) -> AppResult<Json<ApiResponse<UserJobEntryResponse>>> {
    let entry = state
        .services
        .user_jobs
        .update_status(auth_user.user_id, id, req.status, req.notes)
        .await?;
    Ok(Json(
        ApiResponse::ok(entry).with_message("Application status updated successfully"),
    ))
}

/// GET /api/jobs/{id}/status - Whether the caller saved or applied
#[utoipa::path(
    get,
    path = "/{id}/status",
    tag = JOB_TAG,
    params(
        ("id" = i32, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Saved and applied flags", body = ApiResponse<JobStatusResponse>)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn job_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<JobStatusResponse>>> {
    let status = state.services.user_jobs.status(auth_user.user_id, id).await?;
    Ok(Json(ApiResponse::ok(status)))
}
