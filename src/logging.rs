//! Tracing setup for the `cashflow` binary

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default filter directive for a settings log level
pub fn default_directive(level: &str) -> String {
    let level = match level.trim().to_lowercase().as_str() {
        l @ ("error" | "warn" | "info" | "debug" | "trace" | "off") => l.to_string(),
        _ => "warn".to_string(),
    };
    format!("cashflow={}", level)
}

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` wins when set; otherwise only the `cashflow` target is enabled
/// at `level`. Later calls are no-ops.
pub fn init_tracing(level: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

        // A subscriber installed elsewhere (e.g. by a test harness) is kept
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
