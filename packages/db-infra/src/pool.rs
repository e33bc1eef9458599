use std::future::Future;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::error::DbInfraError;

/// Pool sizing for the request-serving application pool.
const APP_MAX_CONNECTIONS: u32 = 20;
const APP_MIN_CONNECTIONS: u32 = 1;
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        DbInfraError::connection("no error recorded after max attempts (this should not happen)")
    }))
}

async fn connect(opt: ConnectOptions, purpose: &'static str) -> Result<DatabaseConnection, DbInfraError> {
    retry_connection(
        || {
            let opt_clone = opt.clone();
            async move {
                Database::connect(opt_clone).await.map_err(|e| {
                    DbInfraError::connection(format!(
                        "failed to connect to Postgres ({purpose}): {e}"
                    ))
                })
            }
        },
        5,
        500,
    )
    .await
}

/// Build the process-wide request-serving pool.
///
/// One pool per process: the caller constructs it once at startup, passes the
/// handle explicitly, and closes it at shutdown.
pub async fn connect_app_pool(url: &str) -> Result<DatabaseConnection, DbInfraError> {
    let mut opt = ConnectOptions::new(url);
    opt.min_connections(APP_MIN_CONNECTIONS)
        .max_connections(APP_MAX_CONNECTIONS)
        .idle_timeout(IDLE_TIMEOUT)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .sqlx_logging(false);

    let pool = connect(opt, "app pool").await?;
    pool.ping()
        .await
        .map_err(|e| DbInfraError::connection(format!("database connection test failed: {e}")))?;
    Ok(pool)
}

/// Build a single-connection pool for one-shot migration runs.
pub async fn build_admin_pool(url: &str) -> Result<DatabaseConnection, DbInfraError> {
    let mut opt = ConnectOptions::new(url);
    opt.min_connections(1)
        .max_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .sqlx_logging(true);

    connect(opt, "admin pool").await
}
