//! Enumerations shared by job, user and alert records.
//!
//! Every variant is stored as a PostgreSQL enum type through
//! `diesel-derive-enum`; database labels match the JSON names.

use std::fmt;

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employment type of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::JobType")]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[db_enum(rename = "full-time")]
    FullTime,
    #[db_enum(rename = "part-time")]
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Freelance,
        JobType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Freelance => "freelance",
            JobType::Internship => "internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size bucket of the hiring company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::CompanySize")]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Startup,
    Small,
    #[default]
    Medium,
    Large,
    Enterprise,
}

/// Seniority expected by a posting, also used on user profiles and alerts
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, DbEnum,
)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ExperienceLevel")]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Period a salary figure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::SalaryPeriod")]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    Hourly,
    Monthly,
    #[default]
    Yearly,
}

/// Lifecycle of a job application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ApplicationStatus")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interviewing,
    Offered,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often an alert may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::AlertFrequency")]
#[serde(rename_all = "lowercase")]
pub enum AlertFrequency {
    Instant,
    #[default]
    Daily,
    Weekly,
}

impl AlertFrequency {
    /// Minimum spacing between two triggers. Instant alerts have none.
    pub fn window(&self) -> jiff::SignedDuration {
        match self {
            AlertFrequency::Instant => jiff::SignedDuration::ZERO,
            AlertFrequency::Daily => jiff::SignedDuration::from_hours(24),
            AlertFrequency::Weekly => jiff::SignedDuration::from_hours(24 * 7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_labels_match_json_names() {
        for job_type in JobType::ALL {
            let json = serde_json::to_string(&job_type).unwrap();
            assert_eq!(json, format!("\"{}\"", job_type.as_str()));
        }
    }

    #[test]
    fn test_job_type_binds_as_database_enum() {
        use crate::schema::jobs;
        use diesel::pg::Pg;
        use diesel::prelude::*;

        let query = jobs::table
            .filter(jobs::job_type.eq(JobType::FullTime))
            .select(jobs::id);
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#""jobs"."job_type" = $1"#), "{sql}");
        assert!(sql.contains("FullTime"), "{sql}");
    }

    #[test]
    fn test_job_type_serde_uses_kebab_case() {
        let json = serde_json::to_string(&JobType::FullTime).unwrap();
        assert_eq!(json, "\"full-time\"");

        let parsed: JobType = serde_json::from_str("\"part-time\"").unwrap();
        assert_eq!(parsed, JobType::PartTime);
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(CompanySize::default(), CompanySize::Medium);
        assert_eq!(ExperienceLevel::default(), ExperienceLevel::Mid);
        assert_eq!(SalaryPeriod::default(), SalaryPeriod::Yearly);
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Applied);
        assert_eq!(AlertFrequency::default(), AlertFrequency::Daily);
    }

    #[test]
    fn test_lowercase_enums_reject_unknown_values() {
        assert!(serde_json::from_str::<ApplicationStatus>("\"hired\"").is_err());
        assert!(serde_json::from_str::<ExperienceLevel>("\"junior\"").is_err());
        assert_eq!(
            serde_json::from_str::<ApplicationStatus>("\"interviewing\"").unwrap(),
            ApplicationStatus::Interviewing
        );
    }

    #[test]
    fn test_alert_frequency_window() {
        assert_eq!(AlertFrequency::Instant.window(), jiff::SignedDuration::ZERO);
        assert_eq!(AlertFrequency::Daily.window().as_secs(), 86_400);
        assert_eq!(AlertFrequency::Weekly.window().as_secs(), 604_800);
    }
}
