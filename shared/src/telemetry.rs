//! Tracing subscriber bootstrap.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a JSON formatter filtered by `RUST_LOG`.
///
/// A subscriber that is already installed is kept; the failure is logged
/// through it.
pub fn init() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }
}
