//! User profile records.

use serde::{Deserialize, Serialize};

use super::DogDto;

/// A user profile stored in the `Users` collection.
///
/// The document id is the auth UID and is not repeated inside the document.
/// `dog_list` mirrors the user's documents in `Dogs`; the repository keeps it
/// in sync on every dog mutation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDto {
    /// Sign-in email address.
    pub email: String,
    /// Owner display name.
    pub name: String,
    /// Denormalised copy of the user's dogs.
    pub dog_list: Vec<DogDto>,
}

impl UserDto {
    /// First dog in the list, used to pre-select a dog for check-in.
    pub fn first_dog(&self) -> Option<&DogDto> {
        self.dog_list.first()
    }
}

/// Identity returned by the authentication gateway after sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Stable auth UID; also the `Users` document id.
    pub uid: String,
    /// Email address on the auth account.
    pub email: String,
    /// Display name on the auth profile, when one is set.
    pub display_name: Option<String>,
}
