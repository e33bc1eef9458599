use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset: workspace crates at info,
/// chatty drivers held at warn.
const DEFAULT_DIRECTIVES: &str = "info,backend=info,migration=info,db_infra=info,sqlx=warn,sea_orm=warn";

/// Install the process-wide JSON subscriber for the server binary.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .init();
}
