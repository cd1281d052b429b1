//! Reqwest-backed Google Places source adapter.
//!
//! This adapter owns transport details only: request parameters, timeout,
//! HTTP and API status mapping, JSON decoding into domain gardens, and the
//! client-side radius filter. Nearby search ranks by distance, which the
//! Places API does not combine with a radius, so the radius is enforced here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{NearbySearchDto, PlaceDetailsDto};
use crate::domain::ports::{GardensRepository, GardensSourceError};
use crate::domain::{DogGarden, Location, filter_within_radius};
use crate::outbound::http_support::status_message;

/// Public Places web service root.
pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/";

const DOG_PARK_TYPE: &str = "park";
const DOG_PARK_KEYWORD: &str = "dog park";
const MIN_PHOTO_WIDTH: u32 = 100;
const MAX_PHOTO_WIDTH: u32 = 1_600;

/// Places source adapter that performs HTTP GET requests against one root.
pub struct GooglePlacesHttpSource {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl GooglePlacesHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GardensSourceError> {
        self.base_url.join(path).map_err(|error| {
            GardensSourceError::invalid_request(format!("invalid places url: {error}"))
        })
    }

    fn nearby_search_url(
        &self,
        centre: &Location,
        language: &str,
    ) -> Result<Url, GardensSourceError> {
        let mut url = self.endpoint("nearbysearch/json")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair(
                    "location",
                    &format!("{},{}", centre.latitude, centre.longitude),
                )
                .append_pair("rankby", "distance")
                .append_pair("type", DOG_PARK_TYPE)
                .append_pair("keyword", DOG_PARK_KEYWORD);
            let language = language.trim();
            if !language.is_empty() {
                query.append_pair("language", language);
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    fn details_url(&self, place_id: &str) -> Result<Url, GardensSourceError> {
        let mut url = self.endpoint("details/json")?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", "photos")
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    fn photo_url(&self, photo_reference: &str, max_width: u32) -> Result<Url, GardensSourceError> {
        let mut url = self.endpoint("photo")?;
        url.query_pairs_mut()
            .append_pair("maxwidth", &clamp_photo_width(max_width).to_string())
            .append_pair("photo_reference", photo_reference)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, GardensSourceError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref()).map_err(|error| {
            GardensSourceError::decode(format!("invalid Places JSON payload: {error}"))
        })
    }
}

#[async_trait]
impl GardensRepository for GooglePlacesHttpSource {
    async fn search_dog_parks(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        language: &str,
    ) -> Result<Vec<DogGarden>, GardensSourceError> {
        let centre = Location::new(latitude, longitude);
        validate_search(&centre, radius_meters)?;

        let url = self.nearby_search_url(&centre, language)?;
        let decoded: NearbySearchDto = self.fetch(url).await?;
        check_api_status(&decoded.status, decoded.error_message.as_deref())?;

        let found = decoded.into_domain_gardens();
        let total = found.len();
        let gardens = filter_within_radius(found, &centre, radius_meters);
        debug!(total, kept = gardens.len(), radius_meters, "places nearby search");
        Ok(gardens)
    }

    async fn get_place_photo_url(
        &self,
        place_id: &str,
        max_width: u32,
    ) -> Result<Option<String>, GardensSourceError> {
        let place_id = place_id.trim();
        if place_id.is_empty() {
            return Err(GardensSourceError::invalid_request(
                "place id must not be blank",
            ));
        }

        let decoded: PlaceDetailsDto = self.fetch(self.details_url(place_id)?).await?;
        if decoded.status == "NOT_FOUND" {
            return Ok(None);
        }
        check_api_status(&decoded.status, decoded.error_message.as_deref())?;

        decoded
            .first_photo_reference()
            .map(|reference| self.photo_url(&reference, max_width).map(String::from))
            .transpose()
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn clamp_photo_width(max_width: u32) -> u32 {
    max_width.clamp(MIN_PHOTO_WIDTH, MAX_PHOTO_WIDTH)
}

fn validate_search(centre: &Location, radius_meters: f64) -> Result<(), GardensSourceError> {
    if !centre.latitude.is_finite() || !centre.longitude.is_finite() {
        return Err(GardensSourceError::invalid_request(
            "search centre must contain finite coordinates",
        ));
    }
    if !(-90.0..=90.0).contains(&centre.latitude) {
        return Err(GardensSourceError::invalid_request(
            "latitude must be within [-90, 90]",
        ));
    }
    if !(-180.0..=180.0).contains(&centre.longitude) {
        return Err(GardensSourceError::invalid_request(
            "longitude must be within [-180, 180]",
        ));
    }
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(GardensSourceError::invalid_request(
            "radius must be a positive number of metres",
        ));
    }
    Ok(())
}

fn check_api_status(status: &str, error_message: Option<&str>) -> Result<(), GardensSourceError> {
    let message = match error_message {
        Some(detail) if !detail.is_empty() => format!("{status}: {detail}"),
        _ => status.to_owned(),
    };
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" => Err(GardensSourceError::rate_limited(message)),
        "REQUEST_DENIED" | "INVALID_REQUEST" => Err(GardensSourceError::invalid_request(message)),
        _ => Err(GardensSourceError::transport(message)),
    }
}

fn map_transport_error(error: reqwest::Error) -> GardensSourceError {
    if error.is_timeout() {
        GardensSourceError::timeout(error.to_string())
    } else {
        GardensSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GardensSourceError {
    let message = status_message(status, body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => GardensSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GardensSourceError::timeout(message)
        }
        _ if status.is_client_error() => GardensSourceError::invalid_request(message),
        _ => GardensSourceError::transport(message),
    }
}
