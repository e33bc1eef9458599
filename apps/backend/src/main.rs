use actix_web::{web, App, HttpServer};
use backend::config::env::AppConfig;
use backend::routes;
use backend::state::app_state::AppState;
use tracing::info;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    println!(
        "🚀 Starting backend on http://{}:{} (env={})",
        config.host, config.port, config.env
    );

    let db = match db_infra::connect_app_pool(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };
    println!("✅ Database connected");

    // Kept aside so the pool can be closed after the server future resolves.
    let shutdown_handle = db.clone();

    let host = config.host.clone();
    let port = config.port;
    let data = web::Data::new(AppState::new(db, config));

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found))
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    if let Err(e) = shutdown_handle.close().await {
        eprintln!("❌ Failed to close database pool: {e}");
        std::process::exit(1);
    }
    info!("Database pool closed");
    Ok(())
}
