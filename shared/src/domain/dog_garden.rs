//! Dog park records shared by all users.

use serde::{Deserialize, Serialize};

use super::Location;

/// A dog park stored in the shared `DogGardens` collection.
///
/// `id` is the Google place id for gardens found through Places, or a
/// generated id for gardens saved without one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DogGarden {
    /// Document id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Link opening the garden in a maps application.
    pub map_url: String,
    /// Garden position.
    pub location: Location,
}

impl DogGarden {
    /// Return whether the garden still needs an id.
    pub fn has_blank_id(&self) -> bool {
        self.id.trim().is_empty()
    }
}

/// Keep gardens within `radius_meters` of `centre`, preserving order.
///
/// # Examples
/// ```
/// use pupfiesta::domain::{DogGarden, Location, filter_within_radius};
///
/// let near = DogGarden {
///     name: "Near".to_owned(),
///     location: Location::new(0.0, 0.0089),
///     ..DogGarden::default()
/// };
/// let far = DogGarden {
///     name: "Far".to_owned(),
///     location: Location::new(0.0, 0.01),
///     ..DogGarden::default()
/// };
///
/// let kept = filter_within_radius(vec![near, far], &Location::new(0.0, 0.0), 1_000.0);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].name, "Near");
/// ```
pub fn filter_within_radius(
    gardens: Vec<DogGarden>,
    centre: &Location,
    radius_meters: f64,
) -> Vec<DogGarden> {
    gardens
        .into_iter()
        .filter(|garden| centre.is_within(&garden.location, radius_meters))
        .collect()
}
