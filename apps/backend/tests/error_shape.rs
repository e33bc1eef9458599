//! End-to-end shape of error responses: classified status code, `{message}`
//! body, and the generic fallback for non-operational errors.

use actix_web::{test, web, App, HttpResponse};
use backend::{classify, AppError, DbErrorKind};
use sea_orm::{DbErr, RuntimeErr};

#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::test_logging::init();
}

async fn conflict() -> Result<HttpResponse, AppError> {
    Err(AppError::db(
        DbErrorKind::UniqueViolation,
        Some("23505".to_string()),
        "duplicate key value violates unique constraint \"migrations_filename_key\"",
    ))
}

async fn internal() -> Result<HttpResponse, AppError> {
    Err(classify(DbErr::Custom(
        "panic in storage layer: secret detail".to_string(),
    )))
}

async fn unavailable() -> Result<HttpResponse, AppError> {
    Err(classify(DbErr::Conn(RuntimeErr::Internal(
        "pool timed out while waiting for an open connection".to_string(),
    ))))
}

#[actix_web::test]
async fn operational_db_errors_expose_a_safe_message() {
    let app = test::init_service(App::new().route("/conflict", web::get().to(conflict))).await;

    let req = test::TestRequest::get().uri("/conflict").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 409);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "A record with this value already exists.");
}

#[actix_web::test]
async fn non_operational_errors_hide_internal_detail() {
    let app = test::init_service(App::new().route("/internal", web::get().to(internal))).await;

    let req = test::TestRequest::get().uri("/internal").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let message = body["message"].as_str().unwrap();
    assert!(!message.contains("secret detail"));
    assert!(message.contains("unexpected internal server error"));
}

#[actix_web::test]
async fn connection_faults_surface_as_503() {
    let app =
        test::init_service(App::new().route("/unavailable", web::get().to(unavailable))).await;

    let req = test::TestRequest::get().uri("/unavailable").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 503);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Database connection error.");
}
