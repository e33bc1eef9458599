//! Shared database configuration and pool construction.
//! Used by the backend and the migration CLI.

pub mod config;
pub mod error;
pub mod pool;

pub use config::{database_url, migrations_dir, RuntimeEnv};
pub use error::DbInfraError;
pub use pool::{build_admin_pool, connect_app_pool};
