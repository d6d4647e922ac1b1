//! Periodic background work.
//!
//! The only task today is alert evaluation, run by tokio-cron-scheduler on
//! the `alerts.schedule` cron expression.

mod guard;
mod scheduler;

pub use guard::{RunGuard, RunPermit};
pub use scheduler::AlertScheduler;
