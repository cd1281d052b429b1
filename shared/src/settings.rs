//! Runtime configuration loaded via OrthoConfig.
//!
//! Every value can come from `PUPFIESTA_*` environment variables, a
//! configuration file or the command line. Accessors supply the production
//! defaults when a value is missing.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::Location;
use crate::outbound::firebase::{DEFAULT_FIRESTORE_URL, DEFAULT_IDENTITY_TOOLKIT_URL};
use crate::outbound::places::DEFAULT_PLACES_URL;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEARCH_RADIUS_METERS: f64 = 5_000.0;
const DEFAULT_LANGUAGE: &str = "en";

/// Configuration values for the Firebase and Places adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PUPFIESTA")]
pub struct PupFiestaSettings {
    /// Web API key of the Firebase project.
    pub firebase_api_key: Option<String>,
    /// Firebase project id used in Firestore document paths.
    pub firebase_project_id: Option<String>,
    /// Google Places API key.
    pub places_api_key: Option<String>,
    /// Identity Toolkit base URL override.
    pub identity_url: Option<String>,
    /// Firestore base URL override.
    pub firestore_url: Option<String>,
    /// Places base URL override.
    pub places_url: Option<String>,
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Budget for acquiring a position, in seconds.
    pub location_timeout_secs: Option<u64>,
    /// Default dog park search radius in metres.
    pub search_radius_meters: Option<f64>,
    /// Language for Places results.
    pub language: Option<String>,
    /// Latitude of the fallback search centre.
    pub fallback_latitude: Option<f64>,
    /// Longitude of the fallback search centre.
    pub fallback_longitude: Option<f64>,
}

fn parse_url(value: Option<&str>, default: &str) -> Result<Url, url::ParseError> {
    Url::parse(value.unwrap_or(default))
}

impl PupFiestaSettings {
    /// Identity Toolkit base URL, falling back to the public endpoint.
    pub fn identity_url(&self) -> Result<Url, url::ParseError> {
        parse_url(self.identity_url.as_deref(), DEFAULT_IDENTITY_TOOLKIT_URL)
    }

    /// Firestore base URL, falling back to the public endpoint.
    pub fn firestore_url(&self) -> Result<Url, url::ParseError> {
        parse_url(self.firestore_url.as_deref(), DEFAULT_FIRESTORE_URL)
    }

    /// Places base URL, falling back to the public endpoint.
    pub fn places_url(&self) -> Result<Url, url::ParseError> {
        parse_url(self.places_url.as_deref(), DEFAULT_PLACES_URL)
    }

    /// Timeout applied to every HTTP request.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// Budget for acquiring a position.
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(
            self.location_timeout_secs
                .unwrap_or(DEFAULT_LOCATION_TIMEOUT_SECS),
        )
    }

    /// Search radius in metres.
    pub fn search_radius_meters(&self) -> f64 {
        self.search_radius_meters
            .unwrap_or(DEFAULT_SEARCH_RADIUS_METERS)
    }

    /// Places result language.
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Fallback search centre, present only when both coordinates are set
    /// and form a valid position.
    pub fn fallback_center(&self) -> Option<Location> {
        let center = Location::new(self.fallback_latitude?, self.fallback_longitude?);
        center.is_valid().then_some(center)
    }
}
