//! Diagnostic tracing for hermes.
//!
//! Tracing is for debugging the tool itself: it goes to stderr, is filtered by
//! `RUST_LOG`, and is separate from the user-facing output printed on stdout.
//! The stats ledger is the only persisted record of invocations.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=hermes=debug hermes sync
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
