use std::collections::BTreeMap;

use actix_web::{test, web, App};
use backend::{routes, AppConfig, AppState};
use db_infra::config::RuntimeEnv;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, RuntimeErr, Value};

#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::test_logging::init();
}

fn test_config() -> AppConfig {
    AppConfig {
        env: RuntimeEnv::Test,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgresql://app:pw@localhost:5432/app_test".to_string(),
        migrations_dir: "./migrations".into(),
    }
}

fn test_state(db: DatabaseConnection) -> web::Data<AppState> {
    web::Data::new(AppState::new(db, test_config()))
}

fn probe_row() -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("health_check", Value::Int(Some(1)))])
}

fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("count", Value::BigInt(Some(count)))])
}

#[actix_web::test]
async fn health_returns_200_without_touching_db() {
    // No queued results: any DB access would error out the handler.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = test::init_service(
        App::new()
            .app_data(test_state(db))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[actix_web::test]
async fn health_detailed_reports_healthy_when_db_responds() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![probe_row()]])
        .append_query_results([vec![count_row(2)]])
        .into_connection();
    let app = test::init_service(
        App::new()
            .app_data(test_state(db))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health/detailed").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["database"]["status"], "connected");
    assert!(body["database"]["response_time_ms"].is_number());
    assert_eq!(body["migrations"], "2");
    assert!(body["memory"]["total_mb"].is_number());
    assert!(body["uptime_secs"].is_number());
}

#[actix_web::test]
async fn health_detailed_reports_unhealthy_when_probe_fails() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Conn(RuntimeErr::Internal(
            "connection refused".to_string(),
        ))])
        .into_connection();
    let app = test::init_service(
        App::new()
            .app_data(test_state(db))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health/detailed").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 503);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"]["status"], "disconnected");
    assert_eq!(body["migrations"], "unknown");
}

#[actix_web::test]
async fn unknown_routes_return_404_with_message() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = test::init_service(
        App::new()
            .app_data(test_state(db))
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found)),
    )
    .await;

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Route not found");
}
