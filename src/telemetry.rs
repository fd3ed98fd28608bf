//! Tracing subscriber setup
//!
//! `RUST_LOG` controls filtering; without it the crate logs at `info` and
//! request spans from `tower_http` at `debug`.

use crate::config::LogFormat;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

const DEFAULT_FILTER: &str = "paystore=info,tower_http=debug";

/// Install the global subscriber; later calls are no-ops
pub fn init(format: LogFormat) {
    INIT_ONCE.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let result = match format {
            LogFormat::Pretty => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .try_init(),
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_current_span(true)
                .try_init(),
        };

        if let Err(e) = result {
            eprintln!("tracing subscriber already installed: {}", e);
        }
    });
}
