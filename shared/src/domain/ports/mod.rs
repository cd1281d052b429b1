//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`AuthGateway`, `DocumentStore`, `GardensRepository`,
//! `LocationProvider`) are implemented by outbound adapters. The driving port
//! `FirebaseRepository` is implemented in the domain and consumed by the view
//! models.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod document_store;
mod firebase_repository;
mod gardens_repository;
mod location_provider;

pub use auth_gateway::{AuthGateway, AuthGatewayError};
pub use document_store::{
    DOG_GARDENS_COLLECTION, DOGS_COLLECTION, Document, DocumentStore, DocumentStoreError,
    FieldFilter, USERS_COLLECTION,
};
#[cfg(test)]
pub use firebase_repository::MockFirebaseRepository;
pub use firebase_repository::FirebaseRepository;
#[cfg(test)]
pub use gardens_repository::MockGardensRepository;
pub use gardens_repository::{FixtureGardensRepository, GardensRepository, GardensSourceError};
#[cfg(test)]
pub use location_provider::MockLocationProvider;
pub use location_provider::{LocationError, LocationProvider, LocationStrategy};
