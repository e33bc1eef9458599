#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod error;
pub mod infra;
pub mod routes;
pub mod state;

// Re-exports for public API
pub use config::env::AppConfig;
pub use error::{classify, AppError, DbErrorKind};
pub use infra::db_errors::kind_for_sqlstate;
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::test_logging::init();
}
