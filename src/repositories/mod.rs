//! Repository layer for data access operations.

mod alert_repo;
mod job_repo;
mod user_job_repo;
mod user_repo;

pub use alert_repo::AlertRepository;
pub use job_repo::{JobAggregates, JobRepository, NameCount, SearchFacets};
pub use user_job_repo::UserJobRepository;
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub jobs: JobRepository,
    pub users: UserRepository,
    pub user_jobs: UserJobRepository,
    pub alerts: AlertRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            jobs: JobRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            user_jobs: UserJobRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool),
        }
    }
}
