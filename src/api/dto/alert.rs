//! Alert (saved search) DTOs.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{Alert, AlertCriteria, AlertFrequency, NewAlert, UpdateAlert};

fn validate_criteria(criteria: &AlertCriteria) -> Result<(), ValidationError> {
    let negative = criteria
        .salary_range
        .is_some_and(|s| s.min.is_some_and(|v| v < 0) || s.max.is_some_and(|v| v < 0));
    if negative {
        return Err(ValidationError::new("salary_range")
            .with_message(Cow::Borrowed("Salary bounds must be positive numbers")));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationsRequest {
    pub email: Option<bool>,
    pub push: Option<bool>,
    pub slack: Option<bool>,
    #[validate(url(message = "Slack webhook must be a valid URL"))]
    pub slack_webhook: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Remote Rust",
    "criteria": { "skills": ["rust"], "remoteOnly": true },
    "frequency": "daily"
}))]
pub struct CreateAlertRequest {
    #[validate(length(min = 2, max = 100, message = "Alert name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_criteria"))]
    pub criteria: AlertCriteria,
    /// Defaults to daily
    pub frequency: Option<AlertFrequency>,
    #[validate(nested)]
    pub notifications: Option<NotificationsRequest>,
    pub is_active: Option<bool>,
}

impl CreateAlertRequest {
    pub fn into_new_alert(self, user_id: i32) -> NewAlert {
        let notifications = self.notifications.unwrap_or_default();
        NewAlert {
            user_id,
            name: self.name.trim().to_string(),
            criteria: serde_json::to_value(&self.criteria).unwrap_or_default(),
            frequency: self.frequency.unwrap_or_default(),
            notify_email: notifications.email.unwrap_or(true),
            notify_push: notifications.push.unwrap_or(false),
            notify_slack: notifications.slack.unwrap_or(false),
            slack_webhook: notifications.slack_webhook,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

/// Absent fields stay unchanged; `criteria` replaces the stored criteria.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    #[validate(length(min = 2, max = 100, message = "Alert name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_criteria"))]
    pub criteria: Option<AlertCriteria>,
    pub frequency: Option<AlertFrequency>,
    #[validate(nested)]
    pub notifications: Option<NotificationsRequest>,
    pub is_active: Option<bool>,
}

impl UpdateAlertRequest {
    pub fn into_changeset(self) -> UpdateAlert {
        let notifications = self.notifications.unwrap_or_default();
        UpdateAlert {
            name: self.name.map(|n| n.trim().to_string()),
            criteria: self
                .criteria
                .and_then(|c| serde_json::to_value(c).ok()),
            frequency: self.frequency,
            notify_email: notifications.email,
            notify_push: notifications.push,
            notify_slack: notifications.slack,
            slack_webhook: notifications.slack_webhook,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub email: bool,
    pub push: bool,
    pub slack: bool,
    pub slack_webhook: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatsResponse {
    pub total_matches: i32,
    pub last_match_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub id: i32,
    pub name: String,
    pub criteria: AlertCriteria,
    #[schema(example = "Skills: rust | Remote only")]
    pub criteria_summary: String,
    pub frequency: AlertFrequency,
    pub notifications: NotificationsResponse,
    pub is_active: bool,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_triggered: Option<jiff::Timestamp>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub next_trigger: Option<jiff::Timestamp>,
    pub stats: AlertStatsResponse,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: jiff::Timestamp,
}

impl From<Alert> for AlertResponse {
    fn from(alert: Alert) -> Self {
        let criteria = alert.criteria();
        Self {
            id: alert.id,
            name: alert.name,
            criteria_summary: criteria.summary(),
            criteria,
            frequency: alert.frequency,
            notifications: NotificationsResponse {
                email: alert.notify_email,
                push: alert.notify_push,
                slack: alert.notify_slack,
                slack_webhook: alert.slack_webhook,
            },
            is_active: alert.is_active,
            last_triggered: alert.last_triggered.map(|t| t.to_jiff()),
            next_trigger: alert.next_trigger.map(|t| t.to_jiff()),
            stats: AlertStatsResponse {
                total_matches: alert.total_matches,
                last_match_count: alert.last_match_count,
            },
            created_at: alert.created_at.to_jiff(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::alert;
    use serde_json::json;

    #[test]
    fn test_create_defaults() {
        let request: CreateAlertRequest =
            serde_json::from_value(json!({ "name": "Rust roles" })).unwrap();
        assert!(request.validate().is_ok());

        let new_alert = request.into_new_alert(7);
        assert_eq!(new_alert.user_id, 7);
        assert_eq!(new_alert.frequency, AlertFrequency::Daily);
        assert!(new_alert.notify_email);
        assert!(!new_alert.notify_slack);
        assert!(new_alert.is_active);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let request: CreateAlertRequest = serde_json::from_value(json!({
            "name": "x",
            "criteria": { "salaryRange": { "min": -1 } },
            "notifications": { "slackWebhook": "not a url" }
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("name"));
        assert!(errors.errors().contains_key("criteria"));
        assert!(errors.errors().contains_key("notifications"));

        let unknown_frequency = serde_json::from_value::<CreateAlertRequest>(json!({
            "name": "Rust roles",
            "frequency": "hourly"
        }));
        assert!(unknown_frequency.is_err());
    }

    #[test]
    fn test_update_changeset_only_touches_given_fields() {
        let request: UpdateAlertRequest = serde_json::from_value(json!({
            "isActive": false,
            "notifications": { "push": true }
        }))
        .unwrap();
        let changes = request.into_changeset();
        assert_eq!(changes.is_active, Some(false));
        assert_eq!(changes.notify_push, Some(true));
        assert!(changes.notify_email.is_none());
        assert!(changes.name.is_none());
        assert!(changes.criteria.is_none());
    }

    #[test]
    fn test_response_includes_summary() {
        let mut a = alert(AlertFrequency::Weekly);
        a.criteria = json!({ "skills": ["rust"], "remoteOnly": true });
        let body = serde_json::to_value(AlertResponse::from(a)).unwrap();
        assert_eq!(body["criteriaSummary"], "Skills: rust | Remote only");
        assert_eq!(body["frequency"], "weekly");
        assert_eq!(body["stats"]["totalMatches"], 0);
    }
}
