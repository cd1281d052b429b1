//! Domain model, ports and services.
//!
//! Purpose: define the records mirrored to documents (users, dogs, dog
//! gardens), the reconciliation rules for the denormalised `dogList`, and the
//! ports adapters implement. Nothing in here depends on an adapter module.
//!
//! Public surface:
//! - `DogDto`, `DogBreed`, `UserDto`, `AuthUser`, `DogGarden`, `Location`.
//! - `RepositoryError`: the `Auth` / `Dog` / `Db` failure taxonomy.
//! - `RemoteFirebaseRepository`: the `FirebaseRepository` implementation.

pub mod dog_list;
pub mod error;
pub mod ports;

mod dog;
mod dog_garden;
mod location;
mod remote_firebase_repository;
mod user;

pub use self::dog::{DogBreed, DogDto};
pub use self::dog_garden::{DogGarden, filter_within_radius};
pub use self::error::RepositoryError;
pub use self::location::{EARTH_RADIUS_METERS, Location};
pub use self::remote_firebase_repository::RemoteFirebaseRepository;
pub use self::user::{AuthUser, UserDto};
