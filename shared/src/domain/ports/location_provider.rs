//! Driven port for acquiring the device position.
//!
//! Each platform supplies its own chain of [`LocationStrategy`] steps (for
//! example fresh fix, then last known position, then a single update); the
//! domain only sees [`LocationProvider::acquire_location`].

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Location;

use super::define_port_error;

define_port_error! {
    /// Errors raised while acquiring a position.
    pub enum LocationError {
        /// No position arrived before the deadline.
        Timeout { waited_ms: u64 } =>
            "location timed out after {waited_ms} ms",
        /// The user denied location access.
        PermissionDenied =>
            "location permission denied",
        /// No strategy could produce a position.
        Unavailable { message: String } =>
            "location unavailable: {message}",
    }
}

/// Bounded position acquisition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Acquire a position, giving up after `timeout`.
    async fn acquire_location(&self, timeout: Duration) -> Result<Location, LocationError>;
}

/// One step in a platform's acquisition chain.
#[async_trait]
pub trait LocationStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Try to produce a position within `budget`; `Ok(None)` passes to the
    /// next step.
    async fn locate(&self, budget: Duration) -> Result<Option<Location>, LocationError>;
}
