//! DTOs for decoding Places web service responses.
//!
//! The adapter decodes into these transport DTOs first, then maps nearby
//! results into domain gardens in one pass. Results lacking a place id or a
//! usable position are skipped rather than failing the whole page.

use serde::Deserialize;
use url::form_urlencoded;

use crate::domain::{DogGarden, Location};

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

#[derive(Debug, Deserialize)]
pub(super) struct NearbySearchDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) results: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaceDto {
    pub(super) place_id: Option<String>,
    #[serde(default)]
    pub(super) name: String,
    pub(super) geometry: Option<GeometryDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    pub(super) location: Option<LatLngDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) lat: f64,
    pub(super) lng: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaceDetailsDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) error_message: Option<String>,
    pub(super) result: Option<PlaceDetailsResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaceDetailsResultDto {
    #[serde(default)]
    pub(super) photos: Vec<PhotoDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotoDto {
    pub(super) photo_reference: String,
}

impl NearbySearchDto {
    pub(super) fn into_domain_gardens(self) -> Vec<DogGarden> {
        self.results
            .into_iter()
            .filter_map(PlaceDto::into_domain_garden)
            .collect()
    }
}

impl PlaceDto {
    fn into_domain_garden(self) -> Option<DogGarden> {
        let place_id = self.place_id.filter(|id| !id.trim().is_empty())?;
        let position = self.geometry?.location?;
        let location = Location::new(position.lat, position.lng);
        if !location.is_valid() {
            return None;
        }

        Some(DogGarden {
            map_url: map_url(&location, &place_id),
            id: place_id,
            name: self.name,
            location,
        })
    }
}

impl PlaceDetailsDto {
    pub(super) fn first_photo_reference(self) -> Option<String> {
        self.result?
            .photos
            .into_iter()
            .map(|photo| photo.photo_reference)
            .find(|reference| !reference.is_empty())
    }
}

/// Universal maps link that opens the place on any platform.
pub(super) fn map_url(location: &Location, place_id: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("api", "1")
        .append_pair(
            "query",
            &format!("{},{}", location.latitude, location.longitude),
        )
        .append_pair("query_place_id", place_id)
        .finish();
    format!("{MAPS_SEARCH_URL}?{query}")
}
