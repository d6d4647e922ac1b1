//! Saved and applied job entries.
//!
//! Both tables are keyed by `(user_id, job_id)`; the upserts below rely on
//! that constraint so concurrent requests cannot create duplicates.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use jiff_diesel::Timestamp;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{ApplicationStatus, AppliedJob, Job, NewAppliedJob, NewSavedJob, SavedJob};
use crate::schema::{applied_jobs, jobs, saved_jobs};
use crate::search::Page;

/// Upsert on `(user_id, job_id)`. The second column is true when the row
/// was inserted rather than updated (`xmax` is zero for fresh tuples).
macro_rules! save_statement {
    ($row:expr) => {
        diesel::insert_into(saved_jobs::table)
            .values($row)
            .on_conflict((saved_jobs::user_id, saved_jobs::job_id))
            .do_update()
            .set((
                saved_jobs::saved_at.eq(excluded(saved_jobs::saved_at)),
                saved_jobs::notes.eq(excluded(saved_jobs::notes)),
            ))
            .returning((SavedJob::as_returning(), sql::<Bool>("(xmax = 0)")))
    };
}

/// Insert that yields no row when the user already applied.
macro_rules! apply_statement {
    ($row:expr) => {
        diesel::insert_into(applied_jobs::table)
            .values($row)
            .on_conflict((applied_jobs::user_id, applied_jobs::job_id))
            .do_nothing()
            .returning(AppliedJob::as_returning())
    };
}

#[derive(Clone)]
pub struct UserJobRepository {
    pool: AsyncDbPool,
}

impl UserJobRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Saves `job_id` for the user, refreshing `saved_at` and `notes` when it
    /// was already saved. The flag is true when a new row was created.
    pub async fn save(
        &self,
        user_id: i32,
        job_id: i32,
        notes: Option<String>,
    ) -> Result<(SavedJob, bool), AppError> {
        let mut conn = self.pool.get().await?;
        let row = NewSavedJob {
            user_id,
            job_id,
            saved_at: Timestamp::from(jiff::Timestamp::now()),
            notes,
        };

        save_statement!(&row)
            .get_result::<(SavedJob, bool)>(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Returns whether a row was removed.
    pub async fn unsave(&self, user_id: i32, job_id: i32) -> Result<bool, AppError> {
        let mut conn = self.pool.get().await?;

        let removed = diesel::delete(
            saved_jobs::table
                .filter(saved_jobs::user_id.eq(user_id))
                .filter(saved_jobs::job_id.eq(job_id)),
        )
        .execute(&mut conn)
        .await?;

        Ok(removed > 0)
    }

    /// Inserts an application, or returns `None` when one already exists.
    pub async fn apply(
        &self,
        user_id: i32,
        job_id: i32,
        notes: Option<String>,
    ) -> Result<Option<AppliedJob>, AppError> {
        let mut conn = self.pool.get().await?;

        let row = NewAppliedJob {
            user_id,
            job_id,
            applied_at: Timestamp::from(jiff::Timestamp::now()),
            status: ApplicationStatus::Applied,
            notes,
        };

        apply_statement!(&row)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Changes the status of an existing application. `notes` replaces the
    /// stored notes only when given.
    pub async fn update_status(
        &self,
        user_id: i32,
        job_id: i32,
        status: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<Option<AppliedJob>, AppError> {
        let mut conn = self.pool.get().await?;
        let target = applied_jobs::table
            .filter(applied_jobs::user_id.eq(user_id))
            .filter(applied_jobs::job_id.eq(job_id));

        let query = match notes {
            Some(notes) => {
                diesel::update(target)
                    .set((applied_jobs::status.eq(status), applied_jobs::notes.eq(notes)))
                    .returning(AppliedJob::as_returning())
                    .get_result(&mut conn)
                    .await
            }
            None => {
                diesel::update(target)
                    .set(applied_jobs::status.eq(status))
                    .returning(AppliedJob::as_returning())
                    .get_result(&mut conn)
                    .await
            }
        };

        query.optional().map_err(AppError::from)
    }

    pub async fn find_saved(&self, user_id: i32, job_id: i32) -> Result<Option<SavedJob>, AppError> {
        let mut conn = self.pool.get().await?;

        saved_jobs::table
            .filter(saved_jobs::user_id.eq(user_id))
            .filter(saved_jobs::job_id.eq(job_id))
            .select(SavedJob::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_applied(
        &self,
        user_id: i32,
        job_id: i32,
    ) -> Result<Option<AppliedJob>, AppError> {
        let mut conn = self.pool.get().await?;

        applied_jobs::table
            .filter(applied_jobs::user_id.eq(user_id))
            .filter(applied_jobs::job_id.eq(job_id))
            .select(AppliedJob::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Saved entries whose job is still active, newest first.
    pub async fn list_saved(
        &self,
        user_id: i32,
        page: Page,
    ) -> Result<(Vec<(SavedJob, Job)>, i64), AppError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = saved_jobs::table
            .inner_join(jobs::table)
            .filter(saved_jobs::user_id.eq(user_id))
            .filter(jobs::is_active.eq(true))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows = saved_jobs::table
            .inner_join(jobs::table)
            .filter(saved_jobs::user_id.eq(user_id))
            .filter(jobs::is_active.eq(true))
            .order((saved_jobs::saved_at.desc(), saved_jobs::id.desc()))
            .select((SavedJob::as_select(), Job::as_select()))
            .limit(page.limit())
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((rows, total))
    }

    /// Applications whose job is still active, optionally by status.
    pub async fn list_applied(
        &self,
        user_id: i32,
        status: Option<ApplicationStatus>,
        page: Page,
    ) -> Result<(Vec<(AppliedJob, Job)>, i64), AppError> {
        let mut conn = self.pool.get().await?;

        let base = || {
            let mut query = applied_jobs::table
                .inner_join(jobs::table)
                .filter(applied_jobs::user_id.eq(user_id))
                .filter(jobs::is_active.eq(true))
                .into_boxed();
            if let Some(status) = status {
                query = query.filter(applied_jobs::status.eq(status));
            }
            query
        };

        let total: i64 = base().count().get_result(&mut conn).await?;

        let rows = base()
            .order((applied_jobs::applied_at.desc(), applied_jobs::id.desc()))
            .select((AppliedJob::as_select(), Job::as_select()))
            .limit(page.limit())
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((rows, total))
    }

    /// Saved and applied totals for a user, regardless of job state.
    pub async fn counts(&self, user_id: i32) -> Result<(i64, i64), AppError> {
        let mut conn = self.pool.get().await?;

        let saved: i64 = saved_jobs::table
            .filter(saved_jobs::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .await?;

        let applied: i64 = applied_jobs::table
            .filter(applied_jobs::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .await?;

        Ok((saved, applied))
    }
}
