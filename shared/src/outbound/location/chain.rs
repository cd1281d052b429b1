//! Ordered fallback across location strategies under one deadline.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, timeout};
use tracing::debug;

use crate::domain::Location;
use crate::domain::ports::{LocationError, LocationProvider, LocationStrategy};

/// Tries each strategy in order until one yields a position.
///
/// Every step is bounded by whatever remains of the caller's timeout. A
/// permission denial stops the chain; other failures and empty answers fall
/// through to the next strategy.
pub struct LocationStrategyChain {
    strategies: Vec<Box<dyn LocationStrategy>>,
}

impl LocationStrategyChain {
    /// Build a chain from strategies in priority order.
    pub fn new(strategies: Vec<Box<dyn LocationStrategy>>) -> Self {
        Self { strategies }
    }
}

#[async_trait]
impl LocationProvider for LocationStrategyChain {
    async fn acquire_location(&self, limit: Duration) -> Result<Location, LocationError> {
        let deadline = Instant::now() + limit;
        let mut last_failure: Option<LocationError> = None;

        for strategy in &self.strategies {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining, strategy.locate(remaining)).await {
                Ok(Ok(Some(location))) => {
                    debug!(strategy = strategy.name(), "location acquired");
                    return Ok(location);
                }
                Ok(Ok(None)) => debug!(strategy = strategy.name(), "strategy had no position"),
                Ok(Err(LocationError::PermissionDenied)) => {
                    return Err(LocationError::permission_denied());
                }
                Ok(Err(error)) => {
                    debug!(strategy = strategy.name(), %error, "strategy failed");
                    last_failure = Some(error);
                }
                Err(_) => {
                    debug!(strategy = strategy.name(), "strategy hit the deadline");
                    break;
                }
            }
        }

        if Instant::now() >= deadline {
            let waited_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            return Err(LocationError::timeout(waited_ms));
        }
        Err(last_failure
            .unwrap_or_else(|| LocationError::unavailable("no strategy produced a position")))
    }
}
