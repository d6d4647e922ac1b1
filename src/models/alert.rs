//! Alert (saved search) model and its trigger bookkeeping.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::models::job::group_thousands;
use crate::models::{AlertFrequency, ExperienceLevel, JobType};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::alerts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Alert {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub criteria: JsonValue,
    pub frequency: AlertFrequency,
    pub notify_email: bool,
    pub notify_push: bool,
    pub notify_slack: bool,
    pub slack_webhook: Option<String>,
    pub is_active: bool,
    pub last_triggered: Option<Timestamp>,
    pub next_trigger: Option<Timestamp>,
    pub total_matches: i32,
    pub last_match_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Alert {
    /// Typed criteria. A malformed JSONB document matches every job.
    pub fn criteria(&self) -> AlertCriteria {
        serde_json::from_value(self.criteria.clone()).unwrap_or_default()
    }

    /// Whether the alert is due at `now`.
    ///
    /// Inactive alerts never fire. Instant alerts and alerts that never fired
    /// always do; otherwise the last trigger must be older than the frequency
    /// window.
    pub fn should_trigger(&self, now: jiff::Timestamp) -> bool {
        if !self.is_active {
            return false;
        }
        if self.frequency == AlertFrequency::Instant {
            return true;
        }
        match self.last_triggered {
            None => true,
            Some(last) => last.to_jiff() < now - self.frequency.window(),
        }
    }

    /// Records a trigger at `now` and schedules the next one a window later.
    pub fn update_trigger_time(&mut self, now: jiff::Timestamp) {
        self.last_triggered = Some(Timestamp::from(now));
        self.next_trigger = Some(Timestamp::from(now + self.frequency.window()));
    }

    pub fn increment_matches(&mut self, count: i32) {
        self.total_matches = self.total_matches.saturating_add(count);
        self.last_match_count = count;
    }
}

/// Persisted outcome of one trigger evaluation
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::alerts)]
pub struct AlertTriggerUpdate {
    pub last_triggered: Option<Timestamp>,
    pub next_trigger: Option<Timestamp>,
    pub total_matches: i32,
    pub last_match_count: i32,
}

impl From<&Alert> for AlertTriggerUpdate {
    fn from(alert: &Alert) -> Self {
        Self {
            last_triggered: alert.last_triggered,
            next_trigger: alert.next_trigger,
            total_matches: alert.total_matches,
            last_match_count: alert.last_match_count,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::alerts)]
pub struct NewAlert {
    pub user_id: i32,
    pub name: String,
    pub criteria: JsonValue,
    pub frequency: AlertFrequency,
    pub notify_email: bool,
    pub notify_push: bool,
    pub notify_slack: bool,
    pub slack_webhook: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::alerts)]
pub struct UpdateAlert {
    pub name: Option<String>,
    pub criteria: Option<JsonValue>,
    pub frequency: Option<AlertFrequency>,
    pub notify_email: Option<bool>,
    pub notify_push: Option<bool>,
    pub notify_slack: Option<bool>,
    pub slack_webhook: Option<String>,
    pub is_active: Option<bool>,
}

/// What an alert looks for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertCriteria {
    pub keywords: Vec<String>,
    pub skills: Vec<String>,
    pub locations: Vec<LocationCriterion>,
    pub remote_only: bool,
    pub job_types: Vec<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub salary_range: Option<SalaryBounds>,
    pub companies: Vec<String>,
    pub exclude_keywords: Vec<String>,
}

/// One entry of a location OR-group; every named part must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LocationCriterion {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl LocationCriterion {
    pub fn is_empty(&self) -> bool {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .all(|part| part.as_deref().is_none_or(|p| p.trim().is_empty()))
    }

    fn label(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SalaryBounds {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl AlertCriteria {
    /// One-line description, e.g. "Keywords: rust | Remote only".
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.keywords.is_empty() {
            parts.push(format!("Keywords: {}", self.keywords.join(", ")));
        }
        if !self.skills.is_empty() {
            parts.push(format!("Skills: {}", self.skills.join(", ")));
        }
        let locations: Vec<String> = self
            .locations
            .iter()
            .filter(|l| !l.is_empty())
            .map(LocationCriterion::label)
            .collect();
        if !locations.is_empty() {
            parts.push(format!("Locations: {}", locations.join("; ")));
        }
        if self.remote_only {
            parts.push("Remote only".to_string());
        }
        if !self.job_types.is_empty() {
            let types: Vec<&str> = self.job_types.iter().map(JobType::as_str).collect();
            parts.push(format!("Job types: {}", types.join(", ")));
        }
        if let Some(level) = self.experience_level {
            parts.push(format!("Experience: {}", level));
        }
        if let Some(salary) = self.salary_range {
            match (salary.min, salary.max) {
                (Some(min), Some(max)) => parts.push(format!(
                    "Salary: ${} - ${}",
                    group_thousands(min),
                    group_thousands(max)
                )),
                (Some(min), None) => parts.push(format!("Salary: ${}+", group_thousands(min))),
                (None, Some(max)) => {
                    parts.push(format!("Salary: up to ${}", group_thousands(max)))
                }
                (None, None) => {}
            }
        }
        if !self.companies.is_empty() {
            parts.push(format!("Companies: {}", self.companies.join(", ")));
        }
        if !self.exclude_keywords.is_empty() {
            parts.push(format!("Excluding: {}", self.exclude_keywords.join(", ")));
        }

        if parts.is_empty() {
            "All jobs".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn alert(frequency: AlertFrequency) -> Alert {
        let epoch = Timestamp::from(jiff::Timestamp::UNIX_EPOCH);
        Alert {
            id: 3,
            user_id: 7,
            name: "Rust jobs".to_string(),
            criteria: serde_json::json!({}),
            frequency,
            notify_email: true,
            notify_push: false,
            notify_slack: false,
            slack_webhook: None,
            is_active: true,
            last_triggered: None,
            next_trigger: None,
            total_matches: 0,
            last_match_count: 0,
            created_at: epoch,
            updated_at: epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::alert;
    use super::*;
    use jiff::SignedDuration;

    fn hours_ago(now: jiff::Timestamp, hours: i64) -> Option<Timestamp> {
        Some(Timestamp::from(now - SignedDuration::from_hours(hours)))
    }

    #[test]
    fn test_daily_alert_respects_window() {
        let now = jiff::Timestamp::now();
        let mut a = alert(AlertFrequency::Daily);

        a.last_triggered = hours_ago(now, 23);
        assert!(!a.should_trigger(now));

        a.last_triggered = hours_ago(now, 25);
        assert!(a.should_trigger(now));
    }

    #[test]
    fn test_weekly_alert_respects_window() {
        let now = jiff::Timestamp::now();
        let mut a = alert(AlertFrequency::Weekly);

        a.last_triggered = hours_ago(now, 24 * 6);
        assert!(!a.should_trigger(now));

        a.last_triggered = hours_ago(now, 24 * 8);
        assert!(a.should_trigger(now));
    }

    #[test]
    fn test_never_triggered_alert_fires() {
        let a = alert(AlertFrequency::Weekly);
        assert!(a.should_trigger(jiff::Timestamp::now()));
    }

    #[test]
    fn test_instant_alert_always_fires() {
        let now = jiff::Timestamp::now();
        let mut a = alert(AlertFrequency::Instant);
        a.last_triggered = hours_ago(now, 0);
        assert!(a.should_trigger(now));
    }

    #[test]
    fn test_inactive_alert_never_fires() {
        let mut a = alert(AlertFrequency::Instant);
        a.is_active = false;
        assert!(!a.should_trigger(jiff::Timestamp::now()));
    }

    #[test]
    fn test_update_trigger_time_schedules_next_window() {
        let now = jiff::Timestamp::now();
        let mut a = alert(AlertFrequency::Daily);
        a.update_trigger_time(now);

        assert_eq!(a.last_triggered.map(|t| t.to_jiff()), Some(now));
        assert_eq!(
            a.next_trigger.map(|t| t.to_jiff()),
            Some(now + SignedDuration::from_hours(24))
        );
        assert!(!a.should_trigger(now));
    }

    #[test]
    fn test_update_trigger_time_instant_is_now() {
        let now = jiff::Timestamp::now();
        let mut a = alert(AlertFrequency::Instant);
        a.update_trigger_time(now);
        assert_eq!(a.next_trigger.map(|t| t.to_jiff()), Some(now));
    }

    #[test]
    fn test_increment_matches() {
        let mut a = alert(AlertFrequency::Daily);
        a.increment_matches(4);
        a.increment_matches(2);
        assert_eq!(a.total_matches, 6);
        assert_eq!(a.last_match_count, 2);

        let update = AlertTriggerUpdate::from(&a);
        assert_eq!(update.total_matches, 6);
        assert_eq!(update.last_match_count, 2);
    }

    #[test]
    fn test_criteria_summary() {
        let criteria = AlertCriteria {
            keywords: vec!["rust".to_string()],
            skills: vec!["tokio".to_string(), "axum".to_string()],
            locations: vec![LocationCriterion {
                city: Some("Austin".to_string()),
                state: Some("TX".to_string()),
                country: None,
            }],
            remote_only: true,
            job_types: vec![JobType::FullTime],
            experience_level: Some(ExperienceLevel::Senior),
            salary_range: Some(SalaryBounds {
                min: Some(100_000),
                max: None,
            }),
            companies: vec![],
            exclude_keywords: vec!["php".to_string()],
        };

        assert_eq!(
            criteria.summary(),
            "Keywords: rust | Skills: tokio, axum | Locations: Austin, TX | Remote only \
             | Job types: full-time | Experience: senior | Salary: $100,000+ | Excluding: php"
        );
    }

    #[test]
    fn test_empty_criteria_summary() {
        assert_eq!(AlertCriteria::default().summary(), "All jobs");
    }

    #[test]
    fn test_malformed_criteria_default() {
        let mut a = alert(AlertFrequency::Daily);
        a.criteria = serde_json::json!({ "skills": 42 });
        assert_eq!(a.criteria(), AlertCriteria::default());
    }
}
