//! Tracing and logging setup shared by every stockkeep binary and test.

/// Initialize process-wide tracing, filtered by `RUST_LOG` (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide tracing with an explicit filter directive,
/// e.g. `"stockkeep_infra=debug,info"`. `RUST_LOG` still wins when set.
pub fn init_with_filter(default_filter: &str) {
    tracing::init_with_filter(default_filter);
}

/// Subscriber construction (filters, layers).
pub mod tracing;
