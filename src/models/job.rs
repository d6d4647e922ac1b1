//! Job posting model.
//!
//! Company, location and salary are flattened into columns; the API layer
//! nests them again when rendering.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::models::{CompanySize, ExperienceLevel, JobType, SalaryPeriod};

/// A job posting as stored in the `jobs` table
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub company_name: String,
    pub company_industry: Option<String>,
    pub company_size: CompanySize,
    pub company_website: Option<String>,
    pub company_logo: Option<String>,
    pub company_rating: Option<f64>,
    pub location_city: String,
    pub location_state: String,
    pub location_country: String,
    pub is_remote: bool,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub salary_currency: String,
    pub salary_period: SalaryPeriod,
    pub skills: Vec<String>,
    pub description: String,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub url: String,
    pub source_site: String,
    pub posted_date: Timestamp,
    pub is_active: bool,
    pub views: i32,
    pub applications: i32,
    pub saved_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// "Remote" for remote postings, otherwise the known parts of
    /// city, state and country joined by ", ".
    pub fn full_location(&self) -> String {
        if self.is_remote {
            return "Remote".to_string();
        }
        [&self.location_city, &self.location_state, &self.location_country]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Human readable salary range, e.g. "$80,000 - $120,000".
    pub fn salary_range(&self) -> String {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => {
                format!("${} - ${}", group_thousands(min), group_thousands(max))
            }
            (Some(min), None) => format!("${}+", group_thousands(min)),
            (None, Some(max)) => format!("Up to ${}", group_thousands(max)),
            (None, None) => "Not specified".to_string(),
        }
    }
}

/// Formats an integer with comma thousands separators.
pub(crate) fn group_thousands(value: i32) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
