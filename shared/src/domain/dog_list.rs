//! Reconciliation of the denormalised `Users.dogList` mirror.
//!
//! The `Dogs` collection is authoritative. Every mutating repository call
//! rewrites the owner's `dogList` with one of these functions after writing
//! the dog document. Entries written by older clients may carry a blank id;
//! they are matched by name (trimmed, case-insensitive) and healed here.

use super::DogDto;

/// Mirror a newly created dog.
///
/// Drops any entry with the same id, or any blank-id entry with the same name,
/// then appends `dog`. The result holds exactly one entry with `dog.id`.
pub fn link_new_dog(dog_list: Vec<DogDto>, dog: &DogDto) -> Vec<DogDto> {
    let mut next: Vec<DogDto> = dog_list
        .into_iter()
        .filter(|entry| !is_same_dog_or_legacy(entry, dog))
        .collect();
    next.push(dog.clone());
    next
}

/// Mirror an updated dog.
///
/// Replaces the entry with the same id; otherwise backfills the first blank-id
/// entry with the same name; otherwise appends.
pub fn patch_updated_dog(mut dog_list: Vec<DogDto>, dog: &DogDto) -> Vec<DogDto> {
    if let Some(entry) = dog_list.iter_mut().find(|entry| entry.id == dog.id) {
        *entry = dog.clone();
        return dog_list;
    }
    if let Some(entry) = dog_list
        .iter_mut()
        .find(|entry| entry.has_blank_id() && entry.same_name_as(&dog.name))
    {
        *entry = dog.clone();
        return dog_list;
    }
    dog_list.push(dog.clone());
    dog_list
}

/// Remove every entry carrying `dog_id`.
pub fn remove_dog(dog_list: Vec<DogDto>, dog_id: &str) -> Vec<DogDto> {
    dog_list
        .into_iter()
        .filter(|entry| entry.id != dog_id)
        .collect()
}

fn is_same_dog_or_legacy(entry: &DogDto, dog: &DogDto) -> bool {
    if !entry.has_blank_id() {
        return entry.id == dog.id;
    }
    entry.same_name_as(&dog.name)
}
