//! Logging bootstrap shared by the workspace's test targets.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// Install a quiet fmt subscriber once per test process.
///
/// Level directives come from `TEST_LOG`, then `RUST_LOG`, then default to
/// `warn` so passing runs stay silent. Safe to call from every test
/// binary's ctor; later calls are no-ops, even when another subscriber
/// already won the race.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}
