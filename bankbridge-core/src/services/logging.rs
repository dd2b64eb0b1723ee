//! Logging setup
//!
//! Structured `tracing` output to stderr, filtered by `RUST_LOG` or the
//! level passed in. Tokens and secrets are never logged in clear text: the
//! adapters only emit masked values (see `domain::redact`).

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when neither `RUST_LOG` nor an explicit level is given
pub const DEFAULT_FILTER: &str = "bankbridge=info,bankbridge_core=info,bankbridge_server=info,warn";

/// Build the filter: explicit level > `RUST_LOG` > default
fn build_filter(level: Option<&str>) -> EnvFilter {
    if let Some(level) = level {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Safe to call more than once; only the first call takes effect.
pub fn init(level: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(build_filter(level))
        .try_init();
}
