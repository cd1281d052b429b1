//! Add, edit and delete dog screen.

use std::sync::Arc;

use tokio::sync::watch;

use super::forms::{DogFields, DogFormData};
use super::state::{FormStore, ViewState};
use crate::domain::ports::FirebaseRepository;
use crate::domain::{DogBreed, DogDto};

/// What the last successful submit did.
#[derive(Debug, Clone, PartialEq)]
pub enum DogOutcome {
    /// The dog was created or updated; carries the persisted dog.
    Saved(DogDto),
    /// The dog with this id was deleted.
    Deleted(String),
}

/// Published state of the dog screen.
pub type DogsState = ViewState<DogFormData, DogOutcome>;

/// Events accepted by [`DogsViewModel::on_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum DogsEvent {
    /// Name edited.
    NameChanged(String),
    /// Breed picked or cleared.
    BreedChanged(Option<DogBreed>),
    /// Weight edited, unparsed.
    WeightChanged(String),
    /// Friendliness toggled.
    FriendlyChanged(bool),
    /// Sex toggled.
    MaleChanged(bool),
    /// Neutered toggled.
    NeuteredChanged(bool),
    /// Photo URL set.
    ImageChanged(String),
    /// Load a stored dog into the form for editing.
    Edit(DogDto),
    /// Add the dog when new, otherwise update it.
    Save,
    /// Delete the dog with this id.
    Delete(String),
    /// Discard the form and any in-flight submit.
    Reset,
}

/// Reducer for dog CRUD.
pub struct DogsViewModel {
    repository: Arc<dyn FirebaseRepository>,
    store: FormStore<DogFormData, DogOutcome>,
}

impl DogsViewModel {
    /// Create a view model in a fresh `Initial` state.
    pub fn new(repository: Arc<dyn FirebaseRepository>) -> Self {
        Self {
            repository,
            store: FormStore::new(),
        }
    }

    /// Observe published state.
    pub fn subscribe(&self) -> watch::Receiver<DogsState> {
        self.store.subscribe()
    }

    /// Current published state.
    pub fn state(&self) -> DogsState {
        self.store.current()
    }

    /// Last-known form snapshot.
    pub fn form(&self) -> DogFormData {
        self.store.form()
    }

    /// Abort in-flight work and return to the form.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Apply one event.
    pub fn on_event(&self, event: DogsEvent) {
        match event {
            DogsEvent::NameChanged(name) => self.edit_fields(|fields| fields.name = name),
            DogsEvent::BreedChanged(breed) => self.edit_fields(|fields| fields.breed = breed),
            DogsEvent::WeightChanged(weight) => {
                self.edit_fields(|fields| fields.weight = weight);
            }
            DogsEvent::FriendlyChanged(flag) => {
                self.edit_fields(|fields| fields.is_friendly = flag);
            }
            DogsEvent::MaleChanged(flag) => self.edit_fields(|fields| fields.is_male = flag),
            DogsEvent::NeuteredChanged(flag) => {
                self.edit_fields(|fields| fields.is_neutered = flag);
            }
            DogsEvent::ImageChanged(url) => self.edit_fields(|fields| fields.img_url = url),
            DogsEvent::Edit(dog) => self.store.replace_form(DogFormData {
                fields: DogFields::from_dog(&dog),
                editing: Some(dog),
                errors: Vec::new(),
            }),
            DogsEvent::Save => self.save(),
            DogsEvent::Delete(dog_id) => self.delete(dog_id),
            DogsEvent::Reset => self.store.reset(),
        }
    }

    fn edit_fields(&self, apply: impl FnOnce(&mut DogFields)) {
        self.store.edit(|form| apply(&mut form.fields));
    }

    fn save(&self) {
        let repository = Arc::clone(&self.repository);
        self.store.submit(
            |form| form.fields.validate(),
            move |form| async move {
                let dog = form.to_dog();
                let saved = if form.is_new() {
                    repository.add_dog_and_link_to_user(dog).await
                } else {
                    repository.update_dog_and_user(dog).await
                };
                saved
                    .map(DogOutcome::Saved)
                    .map_err(|error| error.message().to_owned())
            },
        );
    }

    fn delete(&self, dog_id: String) {
        let repository = Arc::clone(&self.repository);
        self.store.submit(
            |_| Vec::new(),
            move |_| async move {
                let deleted = repository.delete_dog_and_user(&dog_id).await;
                deleted
                    .map(|()| DogOutcome::Deleted(dog_id))
                    .map_err(|error| error.message().to_owned())
            },
        );
    }
}

#[cfg(test)]
#[path = "dogs_tests.rs"]
mod tests;
