use actix_web::{web, HttpResponse};
use serde_json::json;

pub mod health;

/// Configure application routes for the server and for test harnesses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);
}

/// Catch-all for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "message": "Route not found" }))
}
