//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

pub fn init_with_filter(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| EnvFilter::try_new(default_filter).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    // JSON lines with timestamps; `try_init` so repeated calls (tests) are harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
