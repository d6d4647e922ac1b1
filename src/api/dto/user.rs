//! User-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::dto::rules::{validate_currency, validate_password_strength};
use crate::models::{
    ApplicationStatus, ExperienceLevel, JobType, PreferredSalary, UpdateProfile, User,
    UserPreferences,
};
use crate::search::{Page, split_skills};

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct LocationRequest {
    #[validate(length(max = 100, message = "City cannot exceed 100 characters"))]
    #[schema(example = "Lisbon")]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "State cannot exceed 100 characters"))]
    pub state: Option<String>,
    #[validate(length(max = 100, message = "Country cannot exceed 100 characters"))]
    #[schema(example = "Portugal")]
    pub country: Option<String>,
}

/// Lowercased, trimmed skills without blanks.
pub(crate) fn normalize_skills(skills: &[String]) -> Vec<String> {
    split_skills(&skills.join(","))
}

/// Request body for `PUT /api/users/profile`; absent fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters"))]
    pub last_name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<ExperienceLevel>,
    #[validate(nested)]
    pub location: Option<LocationRequest>,
    pub remote_preference: Option<bool>,
    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    pub fn into_changeset(self) -> UpdateProfile {
        let location = self.location.unwrap_or_default();
        UpdateProfile {
            first_name: self.first_name.map(|v| v.trim().to_string()),
            last_name: self.last_name.map(|v| v.trim().to_string()),
            skills: self.skills.as_deref().map(normalize_skills),
            experience: self.experience,
            location_city: location.city,
            location_state: location.state,
            location_country: location.country,
            remote_preference: self.remote_preference,
            bio: self.bio,
            avatar: self.avatar,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    #[schema(format = "password")]
    pub current_password: String,
    #[validate(
        length(min = 6, message = "New password must be at least 6 characters long"),
        custom(function = "validate_password_strength")
    )]
    #[schema(format = "password", min_length = 6)]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SalaryPreferenceRequest {
    #[validate(range(min = 0, message = "Minimum salary must be a positive number"))]
    pub min: Option<i32>,
    #[validate(range(min = 0, message = "Maximum salary must be a positive number"))]
    pub max: Option<i32>,
    #[validate(custom(function = "validate_currency"))]
    #[schema(example = "USD")]
    pub currency: Option<String>,
}

/// Request body for `PUT /api/users/preferences`; merged into the stored
/// preferences, absent fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub job_types: Option<Vec<JobType>>,
    pub skills: Option<Vec<String>>,
    #[validate(nested)]
    pub salary_range: Option<SalaryPreferenceRequest>,
    pub remote_only: Option<bool>,
}

impl UpdatePreferencesRequest {
    pub fn merge_into(self, mut prefs: UserPreferences) -> UserPreferences {
        if let Some(job_types) = self.job_types {
            prefs.job_types = job_types;
        }
        if let Some(skills) = self.skills {
            prefs.skills = normalize_skills(&skills);
        }
        if let Some(salary) = self.salary_range {
            let current = prefs.salary_range.take().unwrap_or_default();
            prefs.salary_range = Some(PreferredSalary {
                min: salary.min.or(current.min),
                max: salary.max.or(current.max),
                currency: salary
                    .currency
                    .map(|c| c.to_uppercase())
                    .unwrap_or(if current.currency.is_empty() {
                        "USD".to_string()
                    } else {
                        current.currency
                    }),
            });
        }
        if let Some(remote_only) = self.remote_only {
            prefs.remote_only = remote_only;
        }
        prefs
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DeactivateRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(format = "password")]
    pub password: String,
}

/// Query of `GET /api/users/jobs/applied`
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ApplicationsQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    #[param(minimum = 1, example = 1)]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub limit: u32,

    /// Only applications in this state
    #[param(inline)]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationsQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationResponse {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Response body for user data (excludes the password hash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub skills: Vec<String>,
    pub experience: Option<ExperienceLevel>,
    pub location: LocationResponse,
    pub remote_preference: bool,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub preferences: UserPreferences,
    pub is_active: bool,
    #[schema(example = 75)]
    pub profile_completion: u8,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_login: Option<jiff::Timestamp>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: jiff::Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let full_name = user.full_name();
        let preferences = user.preferences();
        let profile_completion = user.profile_completion();

        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            full_name,
            skills: user.skills,
            experience: user.experience,
            location: LocationResponse {
                city: user.location_city,
                state: user.location_state,
                country: user.location_country,
            },
            remote_preference: user.remote_preference,
            bio: user.bio,
            avatar: user.avatar,
            preferences,
            is_active: user.is_active,
            profile_completion,
            last_login: user.last_login.map(|t| t.to_jiff()),
            created_at: user.created_at.to_jiff(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub saved_jobs_count: i64,
    pub applied_jobs_count: i64,
    pub alerts_count: i64,
    #[schema(example = 75)]
    pub profile_completion: u8,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_login: Option<jiff::Timestamp>,
    #[schema(value_type = String, format = DateTime)]
    pub member_since: jiff::Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::user;
    use serde_json::json;

    #[test]
    fn test_user_response_hides_password() {
        let mut u = user();
        u.password = "$argon2id$v=19$...".to_string();
        let body = serde_json::to_value(UserResponse::from(u)).unwrap();

        assert!(body.get("password").is_none());
        assert_eq!(body["fullName"], "Jane Doe");
        assert_eq!(body["profileCompletion"], 17);
        assert_eq!(body["preferences"]["remoteOnly"], false);
        assert_eq!(body["lastLogin"], serde_json::Value::Null);
    }

    #[test]
    fn test_profile_changeset_normalizes_skills() {
        let request: UpdateProfileRequest = serde_json::from_value(json!({
            "firstName": " Janet ",
            "skills": ["Rust", " Go ", ""],
            "location": { "city": "Porto" }
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let changes = request.into_changeset();
        assert_eq!(changes.first_name.as_deref(), Some("Janet"));
        assert_eq!(
            changes.skills,
            Some(vec!["rust".to_string(), "go".to_string()])
        );
        assert_eq!(changes.location_city.as_deref(), Some("Porto"));
        assert!(changes.location_country.is_none());
        assert!(changes.last_name.is_none());
    }

    #[test]
    fn test_preferences_merge_keeps_absent_fields() {
        let current = UserPreferences {
            job_types: vec![JobType::Contract],
            skills: vec!["go".to_string()],
            salary_range: Some(PreferredSalary {
                min: Some(50_000),
                max: Some(70_000),
                currency: "EUR".to_string(),
            }),
            remote_only: false,
        };
        let request: UpdatePreferencesRequest = serde_json::from_value(json!({
            "skills": ["Rust"],
            "salaryRange": { "max": 90000 },
            "remoteOnly": true
        }))
        .unwrap();

        let merged = request.merge_into(current);
        assert_eq!(merged.job_types, vec![JobType::Contract]);
        assert_eq!(merged.skills, vec!["rust".to_string()]);
        assert_eq!(
            merged.salary_range,
            Some(PreferredSalary {
                min: Some(50_000),
                max: Some(90_000),
                currency: "EUR".to_string(),
            })
        );
        assert!(merged.remote_only);
    }

    #[test]
    fn test_preferences_validation() {
        let request: UpdatePreferencesRequest = serde_json::from_value(json!({
            "salaryRange": { "min": -5, "currency": "EURO" }
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let bad_type = serde_json::from_value::<UpdatePreferencesRequest>(json!({
            "jobTypes": ["gig"]
        }));
        assert!(bad_type.is_err());
    }

    #[test]
    fn test_change_password_requires_strong_password() {
        let request: ChangePasswordRequest = serde_json::from_value(json!({
            "currentPassword": "Secret123",
            "newPassword": "password"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("new_password"));
    }
}
