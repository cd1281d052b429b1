//! Provider returning a configured position.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Location;
use crate::domain::ports::{LocationError, LocationProvider, LocationStrategy};

/// Location provider for hosts without a positioning device.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocationProvider {
    location: Option<Location>,
}

impl StaticLocationProvider {
    /// Provider that always answers with `location`, or fails when `None`.
    pub const fn new(location: Option<Location>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn acquire_location(&self, _timeout: Duration) -> Result<Location, LocationError> {
        self.location
            .ok_or_else(|| LocationError::unavailable("no static location configured"))
    }
}

#[async_trait]
impl LocationStrategy for StaticLocationProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn locate(&self, _budget: Duration) -> Result<Option<Location>, LocationError> {
        Ok(self.location)
    }
}
