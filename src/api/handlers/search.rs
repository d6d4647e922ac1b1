//! Relevance search, trending skills and search form values.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::SEARCH_TAG;
use crate::api::dto::{
    ApiResponse, JobResponse, RelevanceQuery, SearchFiltersResponse, SkillCount,
};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedQuery;

/// Public search routes.
///
/// # Routes
/// - `GET /` - Jobs ranked by relevance
/// - `GET /trending` - Most listed skills
/// - `GET /filters` - Values offered by the search form
pub fn search_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(relevance_search))
        .routes(routes!(trending_skills))
        .routes(routes!(search_filters))
}

/// GET /api/search - Jobs ranked by text score, skill overlap and age
#[utoipa::path(
    get,
    path = "/",
    tag = SEARCH_TAG,
    params(RelevanceQuery),
    responses(
        (status = 200, description = "Page of jobs, most relevant first", body = ApiResponse<Vec<JobResponse>>),
        (status = 400, description = "Invalid query parameters")
    )
)]
async fn relevance_search(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RelevanceQuery>,
) -> AppResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let (page, hit) = state
        .services
        .jobs
        .relevance(query.filter(), query.page())
        .await?;
    Ok(Json(ApiResponse::from(page).from_cache(hit)))
}

/// GET /api/search/trending - Ten skills listed by the most active jobs
#[utoipa::path(
    get,
    path = "/trending",
    tag = SEARCH_TAG,
    responses(
        (status = 200, description = "Skills with job counts", body = ApiResponse<Vec<SkillCount>>)
    )
)]
async fn trending_skills(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<SkillCount>>>> {
    let (skills, hit) = state.services.jobs.trending_skills().await?;
    Ok(Json(ApiResponse::ok(skills).from_cache(hit)))
}

/// GET /api/search/filters - Distinct values across active jobs
#[utoipa::path(
    get,
    path = "/filters",
    tag = SEARCH_TAG,
    responses(
        (status = 200, description = "Available filter values", body = ApiResponse<SearchFiltersResponse>)
    )
)]
async fn search_filters(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SearchFiltersResponse>>> {
    let (filters, hit) = state.services.jobs.search_filters().await?;
    Ok(Json(ApiResponse::ok(filters).from_cache(hit)))
}
