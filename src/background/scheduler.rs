//! Cron-driven alert evaluation.
//!
//! Each tick asks [`AlertService::evaluate_due`] for every alert whose
//! frequency window has elapsed and logs the pass summary.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::background::guard::RunGuard;
use crate::config::AlertsConfig;
use crate::error::{AppError, AppResult};
use crate::services::AlertService;

fn scheduler_error(e: tokio_cron_scheduler::JobSchedulerError) -> AppError {
    AppError::Internal {
        source: anyhow::Error::from(e),
    }
}

/// Runs alert evaluation on the configured cron schedule.
pub struct AlertScheduler {
    scheduler: Arc<Mutex<JobScheduler>>,
}

impl AlertScheduler {
    /// Registers the evaluation job; nothing runs before [`start`](Self::start).
    pub async fn new(config: &AlertsConfig, alerts: AlertService) -> AppResult<Self> {
        let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;
        scheduler
            .add(evaluation_job(&config.schedule, alerts, RunGuard::new())?)
            .await
            .map_err(scheduler_error)?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
        })
    }

    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .lock()
            .await
            .start()
            .await
            .map_err(scheduler_error)
    }

    /// Stop the scheduler gracefully
    pub async fn stop(&self) -> AppResult<()> {
        self.scheduler
            .lock()
            .await
            .shutdown()
            .await
            .map_err(scheduler_error)
    }
}

/// One tick: evaluate every due alert unless the previous tick is still busy.
fn evaluation_job(schedule: &str, alerts: AlertService, guard: RunGuard) -> AppResult<Job> {
    Job::new_async(schedule, move |_uuid, _lock| {
        let alerts = alerts.clone();
        let guard = guard.clone();

        Box::pin(async move {
            let Some(_permit) = guard.try_begin() else {
                tracing::warn!("previous alert evaluation still running, skipping tick");
                return;
            };

            let started = Instant::now();
            match alerts.evaluate_due(jiff::Timestamp::now()).await {
                Ok(report) => tracing::info!(
                    checked = report.checked,
                    triggered = report.triggered,
                    matches = report.matches,
                    failed = report.failed,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "alert evaluation finished"
                ),
                Err(e) => tracing::error!(error = %e, "alert evaluation failed"),
            }
        })
    })
    .map_err(|e| AppError::Configuration {
        key: "alerts.schedule".to_string(),
        source: anyhow::Error::from(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::repositories::Repositories;
    use diesel_async::AsyncPgConnection;
    use diesel_async::pooled_connection::AsyncDieselConnectionManager;
    use diesel_async::pooled_connection::bb8::Pool;

    fn alert_service() -> AlertService {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new("postgres://localhost/jobhub");
        let repos = Repositories::new(Pool::builder().build_unchecked(manager));
        AlertService::new(repos.alerts, repos.jobs, CacheManager::disabled())
    }

    #[tokio::test]
    async fn test_default_schedule_is_accepted() {
        let schedule = AlertsConfig::default().schedule;
        assert!(evaluation_job(&schedule, alert_service(), RunGuard::new()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_schedule_is_a_configuration_error() {
        match evaluation_job("every quarter hour", alert_service(), RunGuard::new()) {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "alerts.schedule"),
            other => panic!("Expected Configuration error, got {:?}", other.map(|_| ())),
        }
    }
}
