//! Sign-up and login screen.

use std::sync::Arc;

use tokio::sync::watch;

use super::forms::UserFormData;
use super::state::{FormStore, ViewState};
use crate::domain::ports::FirebaseRepository;
use crate::domain::{AuthUser, DogBreed, UserDto};

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub enum UserSession {
    /// A new account and its profile were created.
    Registered(UserDto),
    /// An existing account signed in.
    SignedIn(AuthUser),
}

/// Published state of the user screen.
pub type UserState = ViewState<UserFormData, UserSession>;

/// Events accepted by [`UserViewModel::on_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// Account email edited.
    EmailChanged(String),
    /// Password edited.
    PasswordChanged(String),
    /// Owner name edited.
    NameChanged(String),
    /// First dog's name edited.
    DogNameChanged(String),
    /// First dog's breed picked or cleared.
    DogBreedChanged(Option<DogBreed>),
    /// First dog's weight edited, unparsed.
    DogWeightChanged(String),
    /// Friendliness toggled.
    DogFriendlyChanged(bool),
    /// Sex toggled.
    DogMaleChanged(bool),
    /// Neutered toggled.
    DogNeuteredChanged(bool),
    /// Photo URL set.
    DogImageChanged(String),
    /// Register the account together with its first dog.
    SignUp,
    /// Sign in with email and password.
    Login,
    /// Discard the form and any in-flight submit.
    Reset,
}

/// Reducer for registration and login.
pub struct UserViewModel {
    repository: Arc<dyn FirebaseRepository>,
    store: FormStore<UserFormData, UserSession>,
}

impl UserViewModel {
    /// Create a view model in a fresh `Initial` state.
    pub fn new(repository: Arc<dyn FirebaseRepository>) -> Self {
        Self {
            repository,
            store: FormStore::new(),
        }
    }

    /// Observe published state.
    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.store.subscribe()
    }

    /// Current published state.
    pub fn state(&self) -> UserState {
        self.store.current()
    }

    /// Last-known form snapshot, available in every state.
    pub fn form(&self) -> UserFormData {
        self.store.form()
    }

    /// Abort in-flight work; a pending submit hands back the last form so it
    /// can be sent again.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Apply one event.
    pub fn on_event(&self, event: UserEvent) {
        match event {
            UserEvent::EmailChanged(email) => self.store.edit(|form| form.email = email),
            UserEvent::PasswordChanged(password) => {
                self.store.edit(|form| form.password = password);
            }
            UserEvent::NameChanged(name) => self.store.edit(|form| form.name = name),
            UserEvent::DogNameChanged(name) => self.store.edit(|form| form.dog.name = name),
            UserEvent::DogBreedChanged(breed) => self.store.edit(|form| form.dog.breed = breed),
            UserEvent::DogWeightChanged(weight) => {
                self.store.edit(|form| form.dog.weight = weight);
            }
            UserEvent::DogFriendlyChanged(flag) => {
                self.store.edit(|form| form.dog.is_friendly = flag);
            }
            UserEvent::DogMaleChanged(flag) => self.store.edit(|form| form.dog.is_male = flag),
            UserEvent::DogNeuteredChanged(flag) => {
                self.store.edit(|form| form.dog.is_neutered = flag);
            }
            UserEvent::DogImageChanged(url) => self.store.edit(|form| form.dog.img_url = url),
            UserEvent::SignUp => self.sign_up(),
            UserEvent::Login => self.login(),
            UserEvent::Reset => self.store.reset(),
        }
    }

    fn sign_up(&self) {
        let repository = Arc::clone(&self.repository);
        self.store
            .submit(UserFormData::validate_sign_up, move |form| async move {
                repository
                    .user_registration(
                        form.email.trim(),
                        &form.password,
                        form.name.trim(),
                        vec![form.dog.to_dog()],
                    )
                    .await
                    .map(UserSession::Registered)
                    .map_err(|error| error.message().to_owned())
            });
    }

    fn login(&self) {
        let repository = Arc::clone(&self.repository);
        self.store
            .submit(UserFormData::validate_login, move |form| async move {
                repository
                    .user_login(form.email.trim(), &form.password)
                    .await
                    .map(UserSession::SignedIn)
                    .map_err(|error| error.message().to_owned())
            });
    }
}
