//! Global `tracing` logger setup.
//!
//! + Prints enabled `tracing` events and spans to stdout.
//! + Default level includes INFO, WARN, and ERROR events.
//! + Override with `RUST_LOG`; see
//!   <https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html>.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{
    filter::Targets,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

/// Initialize the global logger, panicking if one is already set.
pub fn init() {
    try_init().expect("Failed to setup logger");
}

/// Try to initialize the global logger, returning `Err` if one is already
/// set (e.g. because multiple integration test binaries raced to set it).
pub fn try_init() -> Result<(), TryInitError> {
    let rust_log_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|rust_log| Targets::from_str(&rust_log).ok())
        .unwrap_or_else(|| Targets::new().with_default(Level::INFO));

    let stdout_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_level(true)
        .with_target(true)
        .with_ansi(true)
        .with_filter(rust_log_filter);

    tracing_subscriber::registry().with(stdout_log).try_init()
}

/// Initialize the logger for tests, silently skipping if `RUST_LOG` isn't
/// set or a logger is already installed.
pub fn init_for_testing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let _ = try_init();
}
