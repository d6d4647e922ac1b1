//! Alert (saved search) management and trigger evaluation.

use crate::api::dto::{AlertResponse, CreateAlertRequest, JobResponse, Paged, UpdateAlertRequest};
use crate::cache::{CacheManager, keys};
use crate::error::{AppError, AppResult};
use crate::models::Alert;
use crate::repositories::{AlertRepository, JobRepository};
use crate::search::{JobFilter, Page, SortSpec};

/// Outcome of one evaluation pass over the due alerts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TriggerReport {
    pub checked: usize,
    pub triggered: usize,
    pub matches: i64,
    pub failed: usize,
}

/// Books `matches` new postings on `alert` as fired at `now`.
pub(crate) fn record_matches(alert: &mut Alert, matches: i64, now: jiff::Timestamp) {
    alert.increment_matches(i32::try_from(matches).unwrap_or(i32::MAX));
    alert.update_trigger_time(now);
}

#[derive(Clone)]
pub struct AlertService {
    alerts: AlertRepository,
    jobs: JobRepository,
    cache: CacheManager,
}

impl AlertService {
    pub fn new(alerts: AlertRepository, jobs: JobRepository, cache: CacheManager) -> Self {
        Self {
            alerts,
            jobs,
            cache,
        }
    }

    async fn owned(&self, user_id: i32, alert_id: i32) -> AppResult<Alert> {
        self.alerts
            .find_for_user(user_id, alert_id)
            .await?
            .ok_or_else(|| AppError::not_found("Alert", alert_id))
    }

    async fn forget_stats(&self, user_id: i32) {
        self.cache.remove(&keys::user(user_id, "stats")).await;
    }

    pub async fn list(&self, user_id: i32) -> AppResult<Vec<AlertResponse>> {
        let alerts = self.alerts.list_for_user(user_id).await?;
        Ok(alerts.into_iter().map(AlertResponse::from).collect())
    }

    pub async fn create(&self, user_id: i32, request: CreateAlertRequest) -> AppResult<AlertResponse> {
        let alert = self.alerts.create(request.into_new_alert(user_id)).await?;
        self.forget_stats(user_id).await;
        tracing::info!(user_id, alert_id = alert.id, "alert created");
        Ok(alert.into())
    }

    pub async fn get(&self, user_id: i32, alert_id: i32) -> AppResult<AlertResponse> {
        Ok(self.owned(user_id, alert_id).await?.into())
    }

    pub async fn update(
        &self,
        user_id: i32,
        alert_id: i32,
        request: UpdateAlertRequest,
    ) -> AppResult<AlertResponse> {
        let alert = self
            .alerts
            .update_for_user(user_id, alert_id, request.into_changeset())
            .await?
            .ok_or_else(|| AppError::not_found("Alert", alert_id))?;
        tracing::info!(user_id, alert_id, "alert updated");
        Ok(alert.into())
    }

    pub async fn delete(&self, user_id: i32, alert_id: i32) -> AppResult<()> {
        if !self.alerts.delete_for_user(user_id, alert_id).await? {
            return Err(AppError::not_found("Alert", alert_id));
        }
        self.forget_stats(user_id).await;
        tracing::info!(user_id, alert_id, "alert deleted");
        Ok(())
    }

    /// Every active job matching the alert's criteria, regardless of when
    /// the alert last fired.
    pub async fn matches(
        &self,
        user_id: i32,
        alert_id: i32,
        page: Page,
    ) -> AppResult<Paged<JobResponse>> {
        let alert = self.owned(user_id, alert_id).await?;
        let filter = JobFilter {
            posted_after: None,
            ..JobFilter::from_alert(&alert)
        };

        let (jobs, total) = self.jobs.search(&filter, SortSpec::default(), page).await?;
        Ok(Paged {
            items: jobs.into_iter().map(JobResponse::from).collect(),
            pagination: page.meta(total),
        })
    }

    /// Fires every alert that is due at `now`: counts postings newer than
    /// its last trigger, books them and schedules the next run.
    ///
    /// A failing alert is logged and skipped so the others still run.
    pub async fn evaluate_due(&self, now: jiff::Timestamp) -> AppResult<TriggerReport> {
        let ready = self.alerts.find_ready_to_trigger(now).await?;
        let mut report = TriggerReport {
            checked: ready.len(),
            ..Default::default()
        };

        for mut alert in ready {
            if !alert.should_trigger(now) {
                continue;
            }
            match self.trigger(&mut alert, now).await {
                Ok(count) => {
                    report.triggered += 1;
                    report.matches += count;
                    tracing::info!(
                        alert_id = alert.id,
                        user_id = alert.user_id,
                        matches = count,
                        total_matches = alert.total_matches,
                        "alert triggered"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(alert_id = alert.id, error = %e, "alert evaluation failed");
                }
            }
        }

        Ok(report)
    }

    async fn trigger(&self, alert: &mut Alert, now: jiff::Timestamp) -> AppResult<i64> {
        let count = self.jobs.count(&JobFilter::from_alert(alert)).await?;
        record_matches(alert, count, now);
        self.alerts.record_trigger(alert).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertFrequency;
    use crate::models::fixtures::alert;
    use jiff::SignedDuration;

    #[test]
    fn test_record_matches_books_counts_and_schedules() {
        let now: jiff::Timestamp = "2025-06-01T12:00:00Z".parse().unwrap();
        let mut a = alert(AlertFrequency::Daily);
        a.total_matches = 4;

        record_matches(&mut a, 3, now);

        assert_eq!(a.total_matches, 7);
        assert_eq!(a.last_match_count, 3);
        assert_eq!(a.last_triggered.map(|t| t.to_jiff()), Some(now));
        assert_eq!(
            a.next_trigger.map(|t| t.to_jiff()),
            Some(now + SignedDuration::from_hours(24))
        );
        assert!(!a.should_trigger(now + SignedDuration::from_hours(23)));
    }

    #[test]
    fn test_record_matches_saturates() {
        let now = jiff::Timestamp::UNIX_EPOCH;
        let mut a = alert(AlertFrequency::Instant);
        record_matches(&mut a, i64::MAX, now);
        assert_eq!(a.last_match_count, i32::MAX);
        assert_eq!(a.next_trigger.map(|t| t.to_jiff()), Some(now));
    }

    #[test]
    fn test_triggered_alert_only_counts_newer_postings() {
        let now: jiff::Timestamp = "2025-06-01T12:00:00Z".parse().unwrap();
        let mut a = alert(AlertFrequency::Weekly);
        assert!(JobFilter::from_alert(&a).posted_after.is_none());

        record_matches(&mut a, 0, now);
        assert_eq!(JobFilter::from_alert(&a).posted_after, Some(now));
    }
}
