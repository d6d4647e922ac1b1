//! Job-related DTOs for API requests and responses.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::dto::rules::{parse_timestamp, validate_timestamp};
use crate::models::{
    AppliedJob, ApplicationStatus, CompanySize, ExperienceLevel, Job, JobType, LocationCriterion,
    SalaryPeriod, SavedJob,
};
use crate::repositories::{JobAggregates, NameCount, SearchFacets};
use crate::search::{JobFilter, Page, SortField, SortOrder, SortSpec, split_skills};

// ============================================================================
// Request DTOs
// ============================================================================

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// `page` / `limit` query parameters
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    /// Items per page
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub limit: u32,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Query parameters of `GET /api/jobs`
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub limit: u32,

    /// Full-text search over title and description
    #[validate(length(max = 200, message = "Keywords cannot exceed 200 characters"))]
    pub keywords: Option<String>,

    /// Matches jobs having any of them; repeat the key or separate with commas
    #[serde(default, deserialize_with = "one_or_many")]
    #[param(example = json!(["rust", "tokio"]))]
    pub skills: Vec<String>,

    /// Partial match on city, state or country
    pub location: Option<String>,

    pub remote: Option<bool>,

    #[param(inline)]
    pub job_type: Option<JobType>,

    #[param(inline)]
    pub experience: Option<ExperienceLevel>,

    #[validate(range(min = 0, message = "Minimum salary must be a positive number"))]
    pub salary_min: Option<i32>,

    #[validate(range(min = 0, message = "Maximum salary must be a positive number"))]
    pub salary_max: Option<i32>,

    /// Partial match on the company name
    pub company: Option<String>,

    pub source_site: Option<String>,

    /// RFC 3339 timestamp or calendar date
    #[validate(custom(function = "validate_timestamp"))]
    #[param(example = "2025-01-01T00:00:00Z")]
    pub posted_after: Option<String>,

    #[param(inline)]
    pub sort_by: Option<SortField>,

    #[param(inline)]
    pub sort_order: Option<SortOrder>,
}

impl JobListQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }

    pub fn sort(&self) -> SortSpec {
        SortSpec::new(
            self.sort_by.unwrap_or_default(),
            self.sort_order.unwrap_or_default(),
        )
    }

    pub fn filter(&self) -> JobFilter {
        JobFilter {
            keywords: self.keywords.clone(),
            skills: self.skills.iter().flat_map(|raw| split_skills(raw)).collect(),
            location: self.location.clone(),
            remote: self.remote,
            job_types: self.job_type.into_iter().collect(),
            experience: self.experience,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            company: self.company.clone(),
            source_site: self.source_site.clone(),
            posted_after: self.posted_after.as_deref().and_then(parse_timestamp),
            ..Default::default()
        }
        .normalized()
    }
}

/// Query parameters of `GET /api/search`
#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct RelevanceQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub limit: u32,

    /// Keywords; matching jobs rank by full-text score
    #[validate(length(max = 200, message = "Keywords cannot exceed 200 characters"))]
    pub q: Option<String>,

    /// Each listed skill a job has adds to its rank
    #[serde(default, deserialize_with = "one_or_many")]
    #[param(example = json!(["rust", "tokio"]))]
    pub skills: Vec<String>,

    /// Partial match on city, state or country
    pub location: Option<String>,
}

impl RelevanceQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }

    pub fn filter(&self) -> JobFilter {
        JobFilter {
            keywords: self.q.clone(),
            skills: self.skills.iter().flat_map(|raw| split_skills(raw)).collect(),
            location: self.location.clone(),
            ..Default::default()
        }
        .normalized()
    }
}

/// `limit` for the similar-jobs endpoint
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SimilarQuery {
    #[serde(default = "default_similar_limit")]
    #[validate(range(min = 1, max = 50, message = "Limit must be between 1 and 50"))]
    #[param(minimum = 1, maximum = 50, example = 5)]
    pub limit: u32,
}

fn default_similar_limit() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SuggestionQuery {
    /// At least two characters, shorter input yields no suggestions
    #[validate(length(max = 100, message = "Query cannot exceed 100 characters"))]
    pub q: Option<String>,
}

/// Either a single string or a list of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct SalaryRangeRequest {
    #[validate(range(min = 0, message = "Minimum salary must be a positive number"))]
    pub min: Option<i32>,
    #[validate(range(min = 0, message = "Maximum salary must be a positive number"))]
    pub max: Option<i32>,
}

/// Body of `POST /api/jobs/search`
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
#[schema(example = json!({
    "keywords": ["backend"],
    "skills": ["rust"],
    "locations": [{ "city": "Berlin" }],
    "jobTypes": ["full-time"],
    "salaryRange": { "min": 80000, "max": 150000 },
    "excludeKeywords": ["php"],
    "sortBy": "jobType.salary.min",
    "sortOrder": "desc"
}))]
pub struct SearchRequest {
    /// Joined into one full-text query
    #[serde(deserialize_with = "one_or_many")]
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub skills: Vec<String>,
    /// OR-group; each entry ANDs the parts it names
    pub locations: Vec<LocationCriterion>,
    pub remote: Option<bool>,
    pub job_types: Vec<JobType>,
    pub experience: Option<ExperienceLevel>,
    #[validate(nested)]
    pub salary_range: Option<SalaryRangeRequest>,
    pub companies: Vec<String>,
    pub exclude_keywords: Vec<String>,
    #[validate(custom(function = "validate_timestamp"))]
    pub posted_after: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl SearchRequest {
    pub fn sort(&self) -> SortSpec {
        SortSpec::new(
            self.sort_by.unwrap_or_default(),
            self.sort_order.unwrap_or_default(),
        )
    }

    pub fn filter(&self) -> JobFilter {
        let keywords: Vec<&str> = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        let salary = self.salary_range.unwrap_or_default();

        JobFilter {
            keywords: (!keywords.is_empty()).then(|| keywords.join(" ")),
            skills: self.skills.clone(),
            locations: self.locations.clone(),
            remote: self.remote,
            job_types: self.job_types.clone(),
            experience: self.experience,
            salary_min: salary.min,
            salary_max: salary.max,
            companies: self.companies.clone(),
            exclude_keywords: self.exclude_keywords.clone(),
            posted_after: self.posted_after.as_deref().and_then(parse_timestamp),
            ..Default::default()
        }
        .normalized()
    }
}

/// Body of save and apply requests
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct JobNotesRequest {
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    #[schema(example = "Referred by a friend")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ApplicationStatusRequest {
    #[schema(example = "interviewing")]
    pub status: ApplicationStatus,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    #[schema(example = "Ferrous Systems")]
    pub name: String,
    pub industry: Option<String>,
    pub size: CompanySize,
    pub website: Option<String>,
    pub logo: Option<String>,
    #[schema(example = 4.5)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationResponse {
    pub city: String,
    pub state: String,
    pub country: String,
    pub remote: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalaryResponse {
    pub min: Option<i32>,
    pub max: Option<i32>,
    #[schema(example = "USD")]
    pub currency: String,
    pub period: SalaryPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobTypeResponse {
    #[serde(rename = "type")]
    pub kind: JobType,
    pub experience: ExperienceLevel,
    pub salary: SalaryResponse,
}

/// A job posting as rendered by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: i32,
    #[schema(example = "Senior Rust Engineer")]
    pub title: String,
    pub company: CompanyResponse,
    pub location: LocationResponse,
    pub job_type: JobTypeResponse,
    pub skills: Vec<String>,
    pub description: String,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub url: String,
    pub source_site: String,
    #[schema(value_type = String, format = DateTime)]
    pub posted_date: jiff::Timestamp,
    pub is_active: bool,
    pub views: i32,
    pub applications: i32,
    pub saved_count: i32,
    #[schema(example = "Berlin, Germany")]
    pub full_location: String,
    #[schema(example = "$90,000 - $130,000")]
    pub salary_range: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: jiff::Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: jiff::Timestamp,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        let full_location = job.full_location();
        let salary_range = job.salary_range();

        Self {
            id: job.id,
            title: job.title,
            company: CompanyResponse {
                name: job.company_name,
                industry: job.company_industry,
                size: job.company_size,
                website: job.company_website,
                logo: job.company_logo,
                rating: job.company_rating,
            },
            location: LocationResponse {
                city: job.location_city,
                state: job.location_state,
                country: job.location_country,
                remote: job.is_remote,
            },
            job_type: JobTypeResponse {
                kind: job.job_type,
                experience: job.experience_level,
                salary: SalaryResponse {
                    min: job.salary_min,
                    max: job.salary_max,
                    currency: job.salary_currency,
                    period: job.salary_period,
                },
            },
            skills: job.skills,
            description: job.description,
            requirements: job.requirements,
            benefits: job.benefits,
            url: job.url,
            source_site: job.source_site,
            posted_date: job.posted_date.to_jiff(),
            is_active: job.is_active,
            views: job.views,
            applications: job.applications,
            saved_count: job.saved_count,
            full_location,
            salary_range,
            created_at: job.created_at.to_jiff(),
            updated_at: job.updated_at.to_jiff(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkillCount {
    #[schema(example = "rust")]
    pub skill: String,
    pub count: i64,
}

impl From<NameCount> for SkillCount {
    fn from(NameCount { name, count }: NameCount) -> Self {
        Self { skill: name, count }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanyCount {
    #[schema(example = "Ferrous Systems")]
    pub company: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatsResponse {
    pub total_jobs: i64,
    pub remote_jobs: i64,
    /// Mean salary midpoint over jobs with both bounds
    pub avg_salary: i64,
    pub top_skills: Vec<SkillCount>,
    pub top_companies: Vec<CompanyCount>,
}

impl From<JobAggregates> for JobStatsResponse {
    fn from(stats: JobAggregates) -> Self {
        Self {
            total_jobs: stats.total_jobs,
            remote_jobs: stats.remote_jobs,
            avg_salary: stats.avg_salary,
            top_skills: stats.top_skills.into_iter().map(SkillCount::from).collect(),
            top_companies: stats
                .top_companies
                .into_iter()
                .map(|NameCount { name, count }| CompanyCount {
                    company: name,
                    count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationOption {
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Values offered by the search form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchFiltersResponse {
    pub job_types: Vec<JobType>,
    pub experience_levels: Vec<ExperienceLevel>,
    pub skills: Vec<String>,
    pub companies: Vec<String>,
    pub locations: Vec<LocationOption>,
}

impl From<SearchFacets> for SearchFiltersResponse {
    fn from(facets: SearchFacets) -> Self {
        Self {
            job_types: facets.job_types,
            experience_levels: facets.experience_levels,
            skills: facets.skills,
            companies: facets.companies,
            locations: facets
                .locations
                .into_iter()
                .map(|(city, state, country)| LocationOption {
                    city,
                    state,
                    country,
                })
                .collect(),
        }
    }
}

/// Whether the caller saved or applied to a job
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub is_saved: bool,
    pub is_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub saved_at: Option<jiff::Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub applied_at: Option<jiff::Timestamp>,
}

impl JobStatusResponse {
    pub fn new(saved: Option<SavedJob>, applied: Option<AppliedJob>) -> Self {
        Self {
            is_saved: saved.is_some(),
            is_applied: applied.is_some(),
            application_status: applied.as_ref().map(|a| a.status),
            saved_at: saved.map(|s| s.saved_at.to_jiff()),
            applied_at: applied.map(|a| a.applied_at.to_jiff()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobResponse {
    pub job: JobResponse,
    #[schema(value_type = String, format = DateTime)]
    pub saved_at: jiff::Timestamp,
    pub notes: Option<String>,
}

impl From<(SavedJob, Job)> for SavedJobResponse {
    fn from((saved, job): (SavedJob, Job)) -> Self {
        Self {
            job: job.into(),
            saved_at: saved.saved_at.to_jiff(),
            notes: saved.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJobResponse {
    pub job: JobResponse,
    #[schema(value_type = String, format = DateTime)]
    pub applied_at: jiff::Timestamp,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

impl From<(AppliedJob, Job)> for AppliedJobResponse {
    fn from((applied, job): (AppliedJob, Job)) -> Self {
        Self {
            job: job.into(),
            applied_at: applied.applied_at.to_jiff(),
            status: applied.status,
            notes: applied.notes,
        }
    }
}

/// Entry returned by save/apply/status actions, without the job body
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJobEntryResponse {
    pub job_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub saved_at: Option<jiff::Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub applied_at: Option<jiff::Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
}

impl From<SavedJob> for UserJobEntryResponse {
    fn from(saved: SavedJob) -> Self {
        Self {
            job_id: saved.job_id,
            saved_at: Some(saved.saved_at.to_jiff()),
            applied_at: None,
            status: None,
            notes: saved.notes,
        }
    }
}

impl From<AppliedJob> for UserJobEntryResponse {
    fn from(applied: AppliedJob) -> Self {
        Self {
            job_id: applied.job_id,
            saved_at: None,
            applied_at: Some(applied.applied_at.to_jiff()),
            status: Some(applied.status),
            notes: applied.notes,
        }
    }
}
