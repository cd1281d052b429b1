//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 position.
///
/// Used for the user's position, the centre of a dog park search, and the
/// position of a stored [`DogGarden`](crate::domain::DogGarden).
///
/// # Examples
/// ```
/// use pupfiesta::domain::Location;
///
/// let tel_aviv = Location::new(32.0853, 34.7818);
/// assert!(tel_aviv.is_valid());
/// assert_eq!(tel_aviv.distance_meters(&tel_aviv), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Location {
    /// Build a location from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Return whether both coordinates are finite and inside WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_meters(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }

    /// Return whether `other` lies within `radius_meters` of this location.
    pub fn is_within(&self, other: &Self, radius_meters: f64) -> bool {
        self.distance_meters(other) <= radius_meters
    }
}
