//! Driven port for discovering dog parks near a point.
//!
//! The production adapter queries Google Places; the domain owns the result
//! shape so view models and the post-auth pipeline stay adapter-agnostic.

use async_trait::async_trait;

use crate::domain::DogGarden;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while searching for dog parks.
    pub enum GardensSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "places transport failed: {message}",
        /// Call exceeded its timeout.
        Timeout { message: String } =>
            "places timeout: {message}",
        /// Provider quota was exhausted.
        RateLimited { message: String } =>
            "places rate limited request: {message}",
        /// Response could not be decoded.
        Decode { message: String } =>
            "places response decode failed: {message}",
        /// Request was rejected before or by the provider.
        InvalidRequest { message: String } =>
            "places request invalid: {message}",
    }
}

/// Dog park discovery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GardensRepository: Send + Sync {
    /// Dog parks near a point, nearest first, limited to `radius_meters`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use pupfiesta::domain::ports::{FixtureGardensRepository, GardensRepository};
    ///
    /// let gardens = FixtureGardensRepository
    ///     .search_dog_parks(32.0853, 34.7818, 5_000.0, "he")
    ///     .await?;
    /// assert!(gardens.is_empty());
    /// # Ok::<(), pupfiesta::domain::ports::GardensSourceError>(())
    /// ```
    async fn search_dog_parks(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        language: &str,
    ) -> Result<Vec<DogGarden>, GardensSourceError>;

    /// Photo URL for a place, `None` when the place has no photos.
    async fn get_place_photo_url(
        &self,
        place_id: &str,
        max_width: u32,
    ) -> Result<Option<String>, GardensSourceError>;
}

/// Fixture implementation that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureGardensRepository;

#[async_trait]
impl GardensRepository for FixtureGardensRepository {
    async fn search_dog_parks(
        &self,
        _latitude: f64,
        _longitude: f64,
        _radius_meters: f64,
        _language: &str,
    ) -> Result<Vec<DogGarden>, GardensSourceError> {
        Ok(Vec::new())
    }

    async fn get_place_photo_url(
        &self,
        _place_id: &str,
        _max_width: u32,
    ) -> Result<Option<String>, GardensSourceError> {
        Ok(None)
    }
}
