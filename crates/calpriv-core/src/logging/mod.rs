//! Structured logging setup.
//!
//! stdout belongs to the embedding application's payloads; all log output
//! goes to stderr, either human-readable or as JSON lines.
//!
//! ```ignore
//! use calpriv_core::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env();
//! init_logging(&config);
//! ```

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events the default filter lets through.
const LOG_TARGETS: &[&str] = &["calpriv_core", "calpriv_config"];

/// Build the env filter: `RUST_LOG` if set and valid, else `config.level`
/// for this workspace's crates.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, config.level))
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(directives)
    })
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by the host
/// application or an earlier test).
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = build_filter(config);

    match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
                    .is_ok()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
                    .is_ok()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init()
            .is_ok(),
    }
}

/// Initialize from the environment.
pub fn init_default_logging() -> bool {
    init_logging(&LogConfig::from_env())
}
