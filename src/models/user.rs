use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::models::{ExperienceLevel, JobType};

/// User model for reading from database
/// Derives Queryable for SELECT operations and Selectable for type-safe column selection
#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub skills: Vec<String>,
    pub experience: Option<ExperienceLevel>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub remote_preference: bool,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub preferences: JsonValue,
    pub is_active: bool,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Typed view of the JSONB preferences column. Malformed documents fall
    /// back to empty preferences.
    pub fn preferences(&self) -> UserPreferences {
        serde_json::from_value(self.preferences.clone()).unwrap_or_default()
    }

    /// Percentage of the twelve tracked profile and preference fields that
    /// are filled in, rounded to the nearest integer.
    pub fn profile_completion(&self) -> u8 {
        let prefs = self.preferences();
        let salary = prefs.salary_range.unwrap_or_default();
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());

        let fields = [
            !self.first_name.trim().is_empty(),
            !self.last_name.trim().is_empty(),
            !self.skills.is_empty(),
            self.experience.is_some(),
            filled(&self.location_city),
            filled(&self.location_country),
            filled(&self.bio),
            filled(&self.avatar),
            !prefs.job_types.is_empty(),
            !prefs.skills.is_empty(),
            salary.min.is_some_and(|v| v > 0),
            salary.max.is_some_and(|v| v > 0),
        ];

        let completed = fields.iter().filter(|f| **f).count();
        ((completed as f64 / fields.len() as f64) * 100.0).round() as u8
    }
}

/// Job search preferences stored as JSONB on the user row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub job_types: Vec<JobType>,
    pub skills: Vec<String>,
    pub salary_range: Option<PreferredSalary>,
    pub remote_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferredSalary {
    pub min: Option<i32>,
    pub max: Option<i32>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// NewUser model for inserting new records
/// Derives Insertable for INSERT operations
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub skills: Vec<String>,
    pub experience: Option<ExperienceLevel>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub remote_preference: bool,
    pub bio: Option<String>,
}

/// Profile fields a user may change; `None` leaves the column untouched
#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<ExperienceLevel>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub remote_preference: Option<bool>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn user() -> User {
        let now = Timestamp::from(jiff::Timestamp::UNIX_EPOCH);
        User {
            id: 7,
            email: "jane@example.com".to_string(),
            password: String::new(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            skills: vec![],
            experience: None,
            location_city: None,
            location_state: None,
            location_country: None,
            remote_preference: false,
            bio: None,
            avatar: None,
            preferences: serde_json::json!({}),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::user;
    use super::*;

    #[test]
    fn test_profile_completion_names_only() {
        // 2 of 12 fields
        assert_eq!(user().profile_completion(), 17);
    }

    #[test]
    fn test_profile_completion_full_profile() {
        let mut u = user();
        u.skills = vec!["rust".to_string()];
        u.experience = Some(ExperienceLevel::Senior);
        u.location_city = Some("Lisbon".to_string());
        u.location_country = Some("Portugal".to_string());
        u.bio = Some("Backend developer".to_string());
        u.avatar = Some("https://example.com/a.png".to_string());
        u.preferences = serde_json::json!({
            "jobTypes": ["full-time"],
            "skills": ["rust"],
            "salaryRange": { "min": 80000, "max": 120000, "currency": "EUR" },
            "remoteOnly": true
        });
        assert_eq!(u.profile_completion(), 100);
    }

    #[test]
    fn test_blank_strings_do_not_count() {
        let mut u = user();
        u.bio = Some("   ".to_string());
        assert_eq!(u.profile_completion(), 17);
    }

    #[test]
    fn test_preferences_fall_back_to_default() {
        let mut u = user();
        u.preferences = serde_json::json!({ "jobTypes": "not-a-list" });
        assert_eq!(u.preferences(), UserPreferences::default());
    }

    #[test]
    fn test_preferences_parse_camel_case() {
        let mut u = user();
        u.preferences = serde_json::json!({ "remoteOnly": true, "skills": ["go"] });
        let prefs = u.preferences();
        assert!(prefs.remote_only);
        assert_eq!(prefs.skills, vec!["go".to_string()]);
        assert!(prefs.salary_range.is_none());
    }
}
