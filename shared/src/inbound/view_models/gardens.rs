//! Dog park search screen.
//!
//! Two searches share one form: `LoadSaved` filters the shared `DogGardens`
//! collection around the centre, `SearchNearby` asks Places for fresh
//! results.

use std::sync::Arc;

use tokio::sync::watch;

use super::forms::GardenSearchForm;
use super::state::{FormStore, ViewState};
use crate::domain::ports::{FirebaseRepository, GardensRepository};
use crate::domain::{DogGarden, Location};

/// Largest search radius the form accepts, in metres.
pub const MAX_SEARCH_RADIUS_METERS: f64 = 50_000.0;

/// Published state of the garden screen.
pub type DogGardensState = ViewState<GardenSearchForm, Vec<DogGarden>>;

/// Events accepted by [`DogGardensViewModel::on_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum DogGardensEvent {
    /// Search centre set or cleared.
    CenterChanged(Option<Location>),
    /// Radius edited, in metres.
    RadiusChanged(f64),
    /// Result language edited.
    LanguageChanged(String),
    /// Filter stored gardens around the centre.
    LoadSaved,
    /// Query Places around the centre.
    SearchNearby,
    /// Discard the form and any in-flight search.
    Reset,
}

/// Reducer for garden discovery.
pub struct DogGardensViewModel {
    repository: Arc<dyn FirebaseRepository>,
    gardens: Arc<dyn GardensRepository>,
    store: FormStore<GardenSearchForm, Vec<DogGarden>>,
}

impl DogGardensViewModel {
    /// Create a view model in a fresh `Initial` state.
    pub fn new(
        repository: Arc<dyn FirebaseRepository>,
        gardens: Arc<dyn GardensRepository>,
    ) -> Self {
        Self {
            repository,
            gardens,
            store: FormStore::new(),
        }
    }

    /// Observe published state.
    pub fn subscribe(&self) -> watch::Receiver<DogGardensState> {
        self.store.subscribe()
    }

    /// Current published state.
    pub fn state(&self) -> DogGardensState {
        self.store.current()
    }

    /// Last-known form snapshot.
    pub fn form(&self) -> GardenSearchForm {
        self.store.form()
    }

    /// Abort in-flight work.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Apply one event.
    pub fn on_event(&self, event: DogGardensEvent) {
        match event {
            DogGardensEvent::CenterChanged(center) => self.store.edit(|form| form.center = center),
            DogGardensEvent::RadiusChanged(radius) => {
                self.store.edit(|form| form.radius_meters = radius);
            }
            DogGardensEvent::LanguageChanged(language) => {
                self.store.edit(|form| form.language = language);
            }
            DogGardensEvent::LoadSaved => self.load_saved(),
            DogGardensEvent::SearchNearby => self.search_nearby(),
            DogGardensEvent::Reset => self.store.reset(),
        }
    }

    fn load_saved(&self) {
        let repository = Arc::clone(&self.repository);
        self.store.submit(validate, move |form| async move {
            let center = form.center.unwrap_or_default();
            repository
                .get_dog_gardens_near(center.latitude, center.longitude, form.radius_meters)
                .await
                .map_err(|error| error.message().to_owned())
        });
    }

    fn search_nearby(&self) {
        let gardens = Arc::clone(&self.gardens);
        self.store.submit(validate, move |form| async move {
            let center = form.center.unwrap_or_default();
            gardens
                .search_dog_parks(
                    center.latitude,
                    center.longitude,
                    form.radius_meters,
                    &form.language,
                )
                .await
                .map_err(|error| error.to_string())
        });
    }
}

fn validate(form: &GardenSearchForm) -> Vec<String> {
    form.validate(MAX_SEARCH_RADIUS_METERS)
}
