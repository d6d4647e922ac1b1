//! HTTP request handlers for API endpoints.
//!
//! Handlers are grouped by resource. Resources with both anonymous and
//! authenticated endpoints expose one router per group so the auth layer
//! can be applied to the protected one only.

pub mod alerts;
pub mod health;
pub mod jobs;
pub mod search;
pub mod users;
