//! Logging setup for the tagbox CLI.
//!
//! Library code emits `tracing` events; this module decides where they
//! go. Logs are written to stderr so stdout stays parseable data.

use tagbox_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// The level comes from the config file unless `--verbose` raises it to
/// debug; `RUST_LOG` overrides both. JSON output is selected by
/// `--json-logs` or `format = "json"` in the config.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let level = if verbose { "debug" } else { &config.level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs || config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}
