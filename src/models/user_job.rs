//! Per-user saved and applied job entries.
//!
//! Both tables carry a unique `(user_id, job_id)` key, so a user holds at most
//! one entry of each kind per job.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::models::ApplicationStatus;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::saved_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SavedJob {
    pub id: i32,
    pub user_id: i32,
    pub job_id: i32,
    pub saved_at: Timestamp,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::saved_jobs)]
pub struct NewSavedJob {
    pub user_id: i32,
    pub job_id: i32,
    pub saved_at: Timestamp,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::applied_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AppliedJob {
    pub id: i32,
    pub user_id: i32,
    pub job_id: i32,
    pub applied_at: Timestamp,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::applied_jobs)]
pub struct NewAppliedJob {
    pub user_id: i32,
    pub job_id: i32,
    pub applied_at: Timestamp,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}
