//! Saved and applied jobs of a user.

use crate::api::dto::{
    AppliedJobResponse, JobStatusResponse, Paged, SavedJobResponse, UserJobEntryResponse,
};
use crate::cache::{CacheManager, keys};
use crate::error::{AppError, AppResult};
use crate::models::{AppliedJob, ApplicationStatus};
use crate::repositories::{JobRepository, UserJobRepository};
use crate::search::Page;

const ALREADY_APPLIED: &str = "Already applied for this job";

/// The insert yields no row when an application already exists.
fn first_application(inserted: Option<AppliedJob>) -> AppResult<AppliedJob> {
    inserted.ok_or_else(|| AppError::bad_request(ALREADY_APPLIED))
}

#[derive(Clone)]
pub struct UserJobService {
    jobs: JobRepository,
    user_jobs: UserJobRepository,
    cache: CacheManager,
}

/// `saved:{page}:{limit}` / `applied:{status}:{page}:{limit}`
fn listing_kind(list: &str, status: Option<ApplicationStatus>, page: Page) -> String {
    match status {
        Some(status) => format!("{list}:{status}:{}:{}", page.page, page.limit),
        None => format!("{list}:all:{}:{}", page.page, page.limit),
    }
}

impl UserJobService {
    pub fn new(jobs: JobRepository, user_jobs: UserJobRepository, cache: CacheManager) -> Self {
        Self {
            jobs,
            user_jobs,
            cache,
        }
    }

    async fn ensure_active_job(&self, job_id: i32) -> AppResult<()> {
        match self.jobs.find_active_by_id(job_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("Job", job_id)),
        }
    }

    /// Save and apply change the job's counters, so listings, searches and
    /// stats go along with the user's own entries.
    async fn invalidate_after_job_write(&self, user_id: i32) {
        self.cache
            .invalidate_pattern(&keys::user_pattern(user_id))
            .await;
        self.cache.invalidate_jobs().await;
    }

    /// Saves or re-saves a job. The flag is true when the entry is new.
    pub async fn save(
        &self,
        user_id: i32,
        job_id: i32,
        notes: Option<String>,
    ) -> AppResult<(UserJobEntryResponse, bool)> {
        self.ensure_active_job(job_id).await?;

        let (saved, created) = self.user_jobs.save(user_id, job_id, notes).await?;
        if created {
            self.jobs.increment_saved_count(job_id).await?;
        }
        self.invalidate_after_job_write(user_id).await;
        tracing::info!(user_id, job_id, created, "job saved");

        Ok((saved.into(), created))
    }

    pub async fn unsave(&self, user_id: i32, job_id: i32) -> AppResult<()> {
        if self.user_jobs.unsave(user_id, job_id).await? {
            self.jobs.decrement_saved_count(job_id).await?;
            self.invalidate_after_job_write(user_id).await;
            tracing::info!(user_id, job_id, "job unsaved");
        }
        Ok(())
    }

    pub async fn apply(
        &self,
        user_id: i32,
        job_id: i32,
        notes: Option<String>,
    ) -> AppResult<UserJobEntryResponse> {
        self.ensure_active_job(job_id).await?;

        let applied = first_application(self.user_jobs.apply(user_id, job_id, notes).await?)?;

        self.jobs.increment_applications(job_id).await?;
        self.invalidate_after_job_write(user_id).await;
        tracing::info!(user_id, job_id, "application submitted");

        Ok(applied.into())
    }

    pub async fn update_status(
        &self,
        user_id: i32,
        job_id: i32,
        status: ApplicationStatus,
        notes: Option<String>,
    ) -> AppResult<UserJobEntryResponse> {
        let applied = self
            .user_jobs
            .update_status(user_id, job_id, status, notes)
            .await?
            .ok_or_else(|| AppError::not_found("Application", job_id))?;

        self.cache
            .invalidate_pattern(&keys::user_pattern(user_id))
            .await;
        tracing::info!(user_id, job_id, %status, "application status updated");

        Ok(applied.into())
    }

    pub async fn status(&self, user_id: i32, job_id: i32) -> AppResult<JobStatusResponse> {
        let saved = self.user_jobs.find_saved(user_id, job_id).await?;
        let applied = self.user_jobs.find_applied(user_id, job_id).await?;
        Ok(JobStatusResponse::new(saved, applied))
    }

    pub async fn saved(
        &self,
        user_id: i32,
        page: Page,
    ) -> AppResult<(Paged<SavedJobResponse>, bool)> {
        let key = keys::user(user_id, &listing_kind("saved", None, page));
        self.cache
            .get_or_compute(&key, None, async {
                let (rows, total) = self.user_jobs.list_saved(user_id, page).await?;
                Ok(Paged {
                    items: rows.into_iter().map(SavedJobResponse::from).collect(),
                    pagination: page.meta(total),
                })
            })
            .await
    }

    pub async fn applied(
        &self,
        user_id: i32,
        status: Option<ApplicationStatus>,
        page: Page,
    ) -> AppResult<(Paged<AppliedJobResponse>, bool)> {
        let key = keys::user(user_id, &listing_kind("applied", status, page));
        self.cache
            .get_or_compute(&key, None, async {
                let (rows, total) = self.user_jobs.list_applied(user_id, status, page).await?;
                Ok(Paged {
                    items: rows.into_iter().map(AppliedJobResponse::from).collect(),
                    pagination: page.meta(total),
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_kind() {
        let page = Page::new(2, 10);
        assert_eq!(listing_kind("saved", None, page), "saved:all:2:10");
        assert_eq!(
            listing_kind("applied", Some(ApplicationStatus::Interviewing), page),
            "applied:interviewing:2:10"
        );
    }

    #[test]
    fn test_repeated_application_is_rejected() {
        let err = first_application(None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest { message } if message == ALREADY_APPLIED));
    }

    #[test]
    fn test_first_application_is_returned() {
        let row = AppliedJob {
            id: 1,
            user_id: 7,
            job_id: 42,
            applied_at: jiff::Timestamp::UNIX_EPOCH.into(),
            status: ApplicationStatus::Applied,
            notes: None,
        };
        assert_eq!(first_application(Some(row)).unwrap().job_id, 42);
    }
}
