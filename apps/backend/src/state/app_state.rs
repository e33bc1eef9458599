use std::time::Instant;

use sea_orm::DatabaseConnection;

use crate::config::env::AppConfig;

/// Application state containing shared resources
///
/// Constructed once in `main` and handed to the server as `web::Data`; the
/// database handle inside is the single process-wide pool.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Validated startup configuration
    pub config: AppConfig,
    started_at: Instant,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config,
            started_at: Instant::now(),
        }
    }

    /// Whole seconds since this state was built (process start for all
    /// practical purposes).
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
