//! Driving contract for account, dog and dog park persistence.
//!
//! Every operation returns a [`RepositoryError`] instead of surfacing adapter
//! failures, so view models only ever branch on `Ok` / `Err`.

use async_trait::async_trait;

use crate::domain::{AuthUser, DogDto, DogGarden, RepositoryError, UserDto};

/// Account, dog and dog park persistence for the signed-in user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FirebaseRepository: Send + Sync {
    /// Sign in with email and password.
    async fn user_login(&self, email: &str, password: &str) -> Result<AuthUser, RepositoryError>;

    /// Create the account, its dogs and its profile document.
    ///
    /// Ordering: auth account, then one `Dogs` document per dog owned by the
    /// new UID, then the `Users` document listing the saved dogs.
    async fn user_registration(
        &self,
        email: &str,
        password: &str,
        name: &str,
        dogs: Vec<DogDto>,
    ) -> Result<UserDto, RepositoryError>;

    /// Read the signed-in user's profile document.
    async fn current_user(&self) -> Result<UserDto, RepositoryError>;

    /// Update display name and email on both the auth profile and the
    /// profile document.
    async fn update_user_profile(&self, name: &str, email: &str)
    -> Result<UserDto, RepositoryError>;

    /// Forget the current session.
    async fn sign_out(&self) -> Result<(), RepositoryError>;

    /// Dogs in `Dogs` owned by the signed-in user.
    async fn get_user_dogs(&self) -> Result<Vec<DogDto>, RepositoryError>;

    /// Persist a new dog for the signed-in user and mirror it into `dogList`.
    async fn add_dog_and_link_to_user(&self, dog: DogDto) -> Result<DogDto, RepositoryError>;

    /// Persist changes to a dog and patch the `dogList` mirror.
    async fn update_dog_and_user(&self, dog: DogDto) -> Result<DogDto, RepositoryError>;

    /// Delete a dog and drop it from the `dogList` mirror.
    async fn delete_dog_and_user(&self, dog_id: &str) -> Result<(), RepositoryError>;

    /// Upsert gardens into the shared collection, assigning ids where blank.
    async fn save_dog_gardens(
        &self,
        items: Vec<DogGarden>,
    ) -> Result<Vec<DogGarden>, RepositoryError>;

    /// Every stored garden.
    async fn get_dog_gardens(&self) -> Result<Vec<DogGarden>, RepositoryError>;

    /// Stored gardens within `radius_meters` of the given point.
    async fn get_dog_gardens_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Vec<DogGarden>, RepositoryError>;
}
