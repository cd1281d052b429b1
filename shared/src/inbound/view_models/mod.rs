//! State reducers consumed by UI hosts.
//!
//! Each view model accepts a closed event enum through `on_event`, launches
//! at most one repository call per submit on its own task scope, and
//! publishes state over a `tokio::sync::watch` channel.

mod dogs;
mod forms;
mod gardens;
mod post_auth;
mod state;
mod user;

pub use dogs::{DogOutcome, DogsEvent, DogsState, DogsViewModel};
pub use forms::{DogFields, DogFormData, GardenSearchForm, UserFormData, is_valid_email};
pub use gardens::{DogGardensEvent, DogGardensState, DogGardensViewModel, MAX_SEARCH_RADIUS_METERS};
pub use post_auth::{
    PostAuthConfig, PostAuthPorts, PostAuthState, PostAuthViewModel, Sleeper, TokioSleeper,
};
pub use state::ViewState;
pub use user::{UserEvent, UserSession, UserState, UserViewModel};
