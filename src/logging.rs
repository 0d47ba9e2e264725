//! Development-time tracing for debugging the engine.
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`; they are not
//! part of the product output. The product artifacts are the JSONL logs
//! written by [`crate::storage::ArtifactStore`], which are always written
//! regardless of this filter.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; defaults to `warn` when unset, or `info` when
/// `verbose` is requested.
pub fn init(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
