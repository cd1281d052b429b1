//! Google Places outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `GardensRepository` port over the legacy Places web service.

mod dto;
mod http_source;

pub use http_source::{DEFAULT_PLACES_URL, GooglePlacesHttpSource};
