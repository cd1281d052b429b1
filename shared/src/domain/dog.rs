//! Dog profile records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dog breed as stored in documents.
///
/// Serialised in `SCREAMING_SNAKE_CASE`. Any value this build does not know
/// decodes to [`DogBreed::Mixed`], which is also the default when a form
/// leaves the breed unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DogBreed {
    /// Labrador Retriever.
    Labrador,
    /// Golden Retriever.
    GoldenRetriever,
    /// German Shepherd.
    GermanShepherd,
    /// Border Collie.
    BorderCollie,
    /// Siberian Husky.
    Husky,
    /// Beagle.
    Beagle,
    /// Boxer.
    Boxer,
    /// Bulldog.
    Bulldog,
    /// Poodle, any size.
    Poodle,
    /// Dachshund.
    Dachshund,
    /// Rottweiler.
    Rottweiler,
    /// Shih Tzu.
    ShihTzu,
    /// Chihuahua.
    Chihuahua,
    /// Pug.
    Pug,
    /// Canaan Dog.
    Canaan,
    /// Mixed or unknown breed.
    #[default]
    #[serde(other)]
    Mixed,
}

impl DogBreed {
    /// Every breed, in picker order.
    pub const ALL: [Self; 16] = [
        Self::Labrador,
        Self::GoldenRetriever,
        Self::GermanShepherd,
        Self::BorderCollie,
        Self::Husky,
        Self::Beagle,
        Self::Boxer,
        Self::Bulldog,
        Self::Poodle,
        Self::Dachshund,
        Self::Rottweiler,
        Self::ShihTzu,
        Self::Chihuahua,
        Self::Pug,
        Self::Canaan,
        Self::Mixed,
    ];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Labrador => "Labrador",
            Self::GoldenRetriever => "Golden Retriever",
            Self::GermanShepherd => "German Shepherd",
            Self::BorderCollie => "Border Collie",
            Self::Husky => "Husky",
            Self::Beagle => "Beagle",
            Self::Boxer => "Boxer",
            Self::Bulldog => "Bulldog",
            Self::Poodle => "Poodle",
            Self::Dachshund => "Dachshund",
            Self::Rottweiler => "Rottweiler",
            Self::ShihTzu => "Shih Tzu",
            Self::Chihuahua => "Chihuahua",
            Self::Pug => "Pug",
            Self::Canaan => "Canaan",
            Self::Mixed => "Mixed",
        }
    }
}

impl fmt::Display for DogBreed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dog profile, stored in the `Dogs` collection and mirrored into the
/// owner's `dogList`.
///
/// ## Invariants
/// - `id` is empty until the dog has been persisted; afterwards it equals the
///   `Dogs` document id.
/// - `owner_id` is the owning user's auth UID once persisted.
///
/// Missing fields decode to their defaults so older documents still load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DogDto {
    /// Document id, blank until persisted.
    pub id: String,
    /// Dog name.
    pub name: String,
    /// Breed.
    pub breed: DogBreed,
    /// Weight in kilograms.
    pub weight: f64,
    /// Hosted photo URL, empty when no photo was uploaded.
    pub img_url: String,
    /// Whether the dog is friendly with other dogs.
    pub is_friendly: bool,
    /// Whether the dog is male.
    pub is_male: bool,
    /// Whether the dog is neutered.
    pub is_neutered: bool,
    /// Auth UID of the owner.
    pub owner_id: String,
}

impl DogDto {
    /// Return whether the dog has not been persisted yet.
    pub fn has_blank_id(&self) -> bool {
        self.id.trim().is_empty()
    }

    /// Compare names the way legacy `dogList` entries are matched: trimmed and
    /// case-insensitive.
    pub fn same_name_as(&self, other_name: &str) -> bool {
        self.name.trim().to_lowercase() == other_name.trim().to_lowercase()
    }
}
