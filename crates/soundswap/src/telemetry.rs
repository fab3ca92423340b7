//! Logging initialization for soundswap.
//!
//! Diagnostics go through `tracing` under the `soundswap::*` targets. The
//! host decides whether to install a subscriber at all; this is the stock one.

use soundswap_conf::TelemetryConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global fmt subscriber filtered by `config.log_level`.
///
/// Returns false if a global subscriber was already set, which makes repeat
/// calls harmless.
pub fn init(config: &TelemetryConfig) -> bool {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = %config.log_level, "telemetry initialized");
    }
    installed
}
