//! Middleware components for request processing.
//!
//! This module contains middleware for logging, request ID tracking,
//! deadlines, error handling and authentication.

mod auth;
mod error_handler;
mod logging;
mod request_id;
mod timeout;

pub use auth::{AuthUser, auth_middleware};
pub use error_handler::{error_to_status_code, global_error_handler, not_found_handler};
pub use logging::logging_middleware;
pub use request_id::{RequestId, request_id_middleware};
pub use timeout::timeout_middleware;
