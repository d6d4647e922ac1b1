//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the cache and handlers.

mod alert_service;
mod job_service;
mod user_job_service;
mod user_service;

pub use alert_service::{AlertService, TriggerReport};
pub use job_service::JobService;
pub use user_job_service::UserJobService;
pub use user_service::UserService;

use crate::cache::CacheManager;
use crate::config::JwtConfig;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since underlying pools use `Arc` internally.
#[derive(Clone)]
pub struct Services {
    pub jobs: JobService,
    pub users: UserService,
    pub user_jobs: UserJobService,
    pub alerts: AlertService,
}

impl Services {
    pub fn new(repos: Repositories, cache: CacheManager, jwt: JwtConfig) -> Self {
        Self {
            jobs: JobService::new(repos.jobs.clone(), cache.clone()),
            users: UserService::new(
                repos.users,
                repos.user_jobs.clone(),
                repos.alerts.clone(),
                cache.clone(),
                jwt,
            ),
            user_jobs: UserJobService::new(repos.jobs.clone(), repos.user_jobs, cache.clone()),
            alerts: AlertService::new(repos.alerts, repos.jobs, cache),
        }
    }
}
