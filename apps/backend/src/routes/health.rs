use std::time::Instant;

use actix_web::{web, HttpResponse};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use sysinfo::{ProcessesToUpdate, System};
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

const PROBE_SQL: &str = "SELECT 1 AS health_check";

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    message: String,
    data: T,
}

#[derive(Debug, Serialize)]
struct BasicHealth {
    status: &'static str,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_ms: Option<u128>,
}

#[derive(Debug, Serialize)]
struct MemoryHealth {
    used_mb: u64,
    total_mb: u64,
    percentage: u64,
}

#[derive(Debug, Serialize)]
struct DetailedHealth {
    status: &'static str,
    timestamp: String,
    uptime_secs: u64,
    version: String,
    environment: &'static str,
    database: DatabaseHealth,
    memory: MemoryHealth,
    migrations: String,
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Resident memory of this process against the machine total, so the
/// endpoint describes the service rather than whatever else the host runs.
fn memory_health() -> MemoryHealth {
    let mut system = System::new();
    system.refresh_memory();
    let total = system.total_memory();

    let used = match sysinfo::get_current_pid() {
        Ok(pid) => {
            system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            system.process(pid).map(|p| p.memory()).unwrap_or(0)
        }
        Err(_) => 0,
    };

    MemoryHealth {
        used_mb: used / 1024 / 1024,
        total_mb: total / 1024 / 1024,
        percentage: if total == 0 { 0 } else { used * 100 / total },
    }
}

/// Liveness: always 200, never touches the database.
async fn health() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ApiResponse {
        success: true,
        message: "Service is healthy".to_string(),
        data: BasicHealth {
            status: "healthy",
            timestamp: now_rfc3339(),
        },
    }))
}

/// Readiness: probes the database and reports process vitals.
/// 200 when the probe answers, 503 otherwise, same body shape in both cases.
async fn health_detailed(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = &app_state.db;

    let probe_start = Instant::now();
    let probe = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            PROBE_SQL.to_string(),
        ))
        .await;
    let response_time_ms = probe_start.elapsed().as_millis();

    let (db_status, database) = match probe {
        Ok(_) => (
            true,
            DatabaseHealth {
                status: "connected",
                response_time_ms: Some(response_time_ms),
            },
        ),
        Err(_) => (
            false,
            DatabaseHealth {
                status: "disconnected",
                response_time_ms: None,
            },
        ),
    };

    let migrations = if db_status {
        match migration::applied_count(db).await {
            Ok(count) => count.to_string(),
            Err(_) => "unknown".to_string(),
        }
    } else {
        "unknown".to_string()
    };

    let body = DetailedHealth {
        status: if db_status { "healthy" } else { "unhealthy" },
        timestamp: now_rfc3339(),
        uptime_secs: app_state.uptime_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: app_state.config.env.as_str(),
        database,
        memory: memory_health(),
        migrations,
    };

    let response = if db_status {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    };
    Ok(response)
}

pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/health/detailed", web::get().to(health_detailed));
}

#[cfg(test)]
mod tests {
    use super::memory_health;

    #[test]
    fn memory_health_reports_own_process_footprint() {
        let memory = memory_health();
        // A test binary's resident set is a sliver of the machine, which is
        // not true of machine-wide used memory on a busy host.
        assert!(memory.total_mb > 0);
        assert!(memory.used_mb < memory.total_mb);
        assert!(memory.percentage <= 100);
    }
}
