//! Telemetry bootstrap for binaries and test harnesses embedding the
//! library. Library code itself only emits through `tracing`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "HEDDLE_LOG";

/// Initialize tracing with the HEDDLE_LOG environment variable.
///
/// Defaults to "info" level if HEDDLE_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
