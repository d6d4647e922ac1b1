//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `job` - listings, search bodies, search facets, stats and per-user job entries
//! - `user` / `auth` - accounts, profile and preferences
//! - `alert` - saved searches
//! - `envelope` / `error` - the shared success and error bodies

mod alert;
mod auth;
mod envelope;
mod error;
mod health;
mod job;
mod rules;
mod user;

pub use alert::{AlertResponse, CreateAlertRequest, UpdateAlertRequest};
pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use envelope::{ApiResponse, Paged};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use job::{
    AppliedJobResponse, ApplicationStatusRequest, JobListQuery, JobNotesRequest, JobResponse,
    JobStatsResponse, JobStatusResponse, LocationOption, PageQuery, RelevanceQuery,
    SavedJobResponse, SearchFiltersResponse, SearchRequest, SimilarQuery, SkillCount,
    SuggestionQuery, UserJobEntryResponse,
};
pub use user::{
    ApplicationsQuery, ChangePasswordRequest, DeactivateRequest, UpdatePreferencesRequest,
    UpdateProfileRequest, UserResponse, UserStatsResponse,
};
pub(crate) use user::normalize_skills;
