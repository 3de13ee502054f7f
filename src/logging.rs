//! Console logging for the demo binary.
//!
//! Verbosity follows `RUST_LOG` and defaults to `info`, which is the level
//! [`TracingObserver`](crate::message::TracingObserver) narrates at.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub fn default_filter() -> &'static str {
    "info"
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()
}
