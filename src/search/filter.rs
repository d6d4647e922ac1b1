//! Typed job filter shared by listings, structured search and alerts.

use serde::Serialize;

use crate::models::{Alert, ExperienceLevel, JobType, LocationCriterion};

/// Conditions a job must satisfy.
///
/// Empty lists and `None` values impose no condition. The serialized form is
/// deterministic (field order, absent values omitted) and is used to build
/// cache keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<LocationCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job_types: Vec<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_site: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_after: Option<jiff::Timestamp>,
}

impl JobFilter {
    /// Filter for the jobs an alert is looking for. Only postings newer than
    /// the alert's last trigger are considered.
    pub fn from_alert(alert: &Alert) -> Self {
        let criteria = alert.criteria();
        let keywords = non_blank(&criteria.keywords);
        let salary = criteria.salary_range.unwrap_or_default();

        Self {
            keywords: (!keywords.is_empty()).then(|| keywords.join(" ")),
            skills: lowercase_all(&criteria.skills),
            locations: criteria
                .locations
                .into_iter()
                .filter(|l| !l.is_empty())
                .collect(),
            remote: criteria.remote_only.then_some(true),
            job_types: criteria.job_types,
            experience: criteria.experience_level,
            salary_min: salary.min,
            salary_max: salary.max,
            companies: non_blank(&criteria.companies),
            exclude_keywords: non_blank(&criteria.exclude_keywords),
            posted_after: alert.last_triggered.map(|t| t.to_jiff()),
            ..Default::default()
        }
    }

    /// Normalizes user input: trims text, drops blanks and lowercases
    /// skills and source site.
    pub fn normalized(mut self) -> Self {
        self.keywords = trimmed(self.keywords);
        self.location = trimmed(self.location);
        self.company = trimmed(self.company);
        self.source_site = trimmed(self.source_site).map(|s| s.to_lowercase());
        self.skills = lowercase_all(&self.skills);
        self.companies = non_blank(&self.companies);
        self.exclude_keywords = non_blank(&self.exclude_keywords);
        self.locations.retain(|l| !l.is_empty());
        self
    }

    /// Deterministic JSON form used in cache keys.
    pub fn cache_fragment(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Splits a comma separated skill list, lowercasing each entry.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
