//! Database connection pool and schema migrations.
//!
//! Provides async PostgreSQL connection pooling using diesel_async with bb8.

mod migrate;
mod pool;

pub use migrate::{MIGRATIONS, pending_migrations, revert_migrations, run_pending_migrations};
pub use pool::{AsyncDbPool, establish_async_connection_pool};
