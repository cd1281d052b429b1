//! Firebase repository service.
//!
//! Implements the [`FirebaseRepository`] driving port over the
//! [`AuthGateway`] and [`DocumentStore`] driven ports. Dog mutations are two
//! writes (the `Dogs` document, then the owner's `dogList` mirror) with
//! explicit reconciliation from [`dog_list`](crate::domain::dog_list). The
//! writes are not transactional: a failure between them leaves the mirror
//! stale until the next mutation of that dog heals it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::dog_list::{link_new_dog, patch_updated_dog, remove_dog};
use crate::domain::error::message_or;
use crate::domain::ports::{
    AuthGateway, AuthGatewayError, DOG_GARDENS_COLLECTION, DOGS_COLLECTION, DocumentStore,
    DocumentStoreError, FieldFilter, FirebaseRepository, USERS_COLLECTION,
};
use crate::domain::{
    AuthUser, DogDto, DogGarden, Location, RepositoryError, UserDto, filter_within_radius,
};

/// Repository backed by an auth provider and a document store.
#[derive(Clone)]
pub struct RemoteFirebaseRepository<A, S> {
    auth: Arc<A>,
    store: Arc<S>,
}

impl<A, S> RemoteFirebaseRepository<A, S> {
    /// Create a repository over the given adapters.
    pub fn new(auth: Arc<A>, store: Arc<S>) -> Self {
        Self { auth, store }
    }
}

fn auth_failure(error: AuthGatewayError) -> RepositoryError {
    debug!(%error, "auth gateway call failed");
    RepositoryError::auth(message_or(&error, "Authentication failed"))
}

fn dog_failure(error: DocumentStoreError) -> RepositoryError {
    debug!(%error, "dog persistence failed");
    RepositoryError::dog(message_or(&error, "Dog operation failed"))
}

fn db_failure(error: DocumentStoreError) -> RepositoryError {
    debug!(%error, "document store call failed");
    RepositoryError::db(message_or(&error, "Database operation failed"))
}

fn to_document<T: Serialize>(value: &T) -> Result<Value, DocumentStoreError> {
    serde_json::to_value(value)
        .map_err(|error| DocumentStoreError::decode(format!("encode document: {error}")))
}

impl<A, S> RemoteFirebaseRepository<A, S>
where
    A: AuthGateway,
    S: DocumentStore,
{
    fn current_uid(&self) -> Result<String, RepositoryError> {
        self.auth
            .current_user()
            .map(|user| user.uid)
            .ok_or_else(|| RepositoryError::auth("No authenticated user"))
    }

    async fn load_user(&self, uid: &str) -> Result<Option<UserDto>, DocumentStoreError> {
        match self.store.get(USERS_COLLECTION, uid).await? {
            Some(document) => document.decode().map(Some),
            None => Ok(None),
        }
    }

    async fn write_user(&self, uid: &str, user: &UserDto) -> Result<(), DocumentStoreError> {
        self.store
            .set(USERS_COLLECTION, uid, &to_document(user)?)
            .await
    }

    async fn write_dog(&self, dog: &DogDto) -> Result<(), DocumentStoreError> {
        self.store
            .set(DOGS_COLLECTION, &dog.id, &to_document(dog)?)
            .await
    }

    async fn rewrite_dog_list<F>(&self, uid: &str, reconcile: F) -> Result<(), DocumentStoreError>
    where
        F: FnOnce(Vec<DogDto>) -> Vec<DogDto> + Send,
    {
        let mut user = self.load_user(uid).await?.ok_or_else(|| {
            DocumentStoreError::query(format!("user profile '{uid}' not found"))
        })?;
        user.dog_list = reconcile(std::mem::take(&mut user.dog_list));
        self.write_user(uid, &user).await
    }

    async fn resolve_dog_id(&self, owner_id: &str, name: &str) -> Result<String, RepositoryError> {
        let filters = [
            FieldFilter::equal("ownerId", owner_id),
            FieldFilter::equal("name", name),
        ];
        let matches = self
            .store
            .find_equal(DOGS_COLLECTION, &filters)
            .await
            .map_err(dog_failure)?;
        matches
            .into_iter()
            .next()
            .map(|document| document.id)
            .ok_or_else(|| {
                RepositoryError::dog(format!("Dog '{name}' could not be resolved for update"))
            })
    }

    fn with_generated_id(&self, dog: DogDto, owner_id: &str) -> DogDto {
        let id = if dog.has_blank_id() {
            self.store.new_document_id(DOGS_COLLECTION)
        } else {
            dog.id
        };
        DogDto {
            id,
            owner_id: owner_id.to_owned(),
            ..dog
        }
    }
}

#[async_trait]
impl<A, S> FirebaseRepository for RemoteFirebaseRepository<A, S>
where
    A: AuthGateway,
    S: DocumentStore,
{
    async fn user_login(&self, email: &str, password: &str) -> Result<AuthUser, RepositoryError> {
        let user = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(auth_failure)?;
        info!(uid = %user.uid, "user signed in");
        Ok(user)
    }

    async fn user_registration(
        &self,
        email: &str,
        password: &str,
        name: &str,
        dogs: Vec<DogDto>,
    ) -> Result<UserDto, RepositoryError> {
        let account = self
            .auth
            .sign_up(email, password, name)
            .await
            .map_err(auth_failure)?;

        let mut saved_dogs = Vec::with_capacity(dogs.len());
        for dog in dogs {
            let dog = self.with_generated_id(dog, &account.uid);
            self.write_dog(&dog).await.map_err(dog_failure)?;
            saved_dogs.push(dog);
        }

        let user = UserDto {
            email: email.to_owned(),
            name: name.to_owned(),
            dog_list: saved_dogs,
        };
        self.write_user(&account.uid, &user)
            .await
            .map_err(db_failure)?;
        info!(uid = %account.uid, dogs = user.dog_list.len(), "user registered");
        Ok(user)
    }

    async fn current_user(&self) -> Result<UserDto, RepositoryError> {
        let uid = self.current_uid()?;
        self.load_user(&uid)
            .await
            .map_err(db_failure)?
            .ok_or_else(|| RepositoryError::db("User profile not found"))
    }

    async fn update_user_profile(
        &self,
        name: &str,
        email: &str,
    ) -> Result<UserDto, RepositoryError> {
        let uid = self.current_uid()?;
        self.auth
            .update_profile(name, email)
            .await
            .map_err(auth_failure)?;

        let existing = self.load_user(&uid).await.map_err(db_failure)?;
        let user = UserDto {
            email: email.to_owned(),
            name: name.to_owned(),
            dog_list: existing.map(|user| user.dog_list).unwrap_or_default(),
        };
        self.write_user(&uid, &user).await.map_err(db_failure)?;
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), RepositoryError> {
        self.auth.sign_out();
        Ok(())
    }

    async fn get_user_dogs(&self) -> Result<Vec<DogDto>, RepositoryError> {
        let uid = self.current_uid()?;
        let documents = self
            .store
            .find_equal(DOGS_COLLECTION, &[FieldFilter::equal("ownerId", uid)])
            .await
            .map_err(db_failure)?;
        documents
            .iter()
            .map(|document| {
                document.decode::<DogDto>().map(|dog| DogDto {
                    id: document.id.clone(),
                    ..dog
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_failure)
    }

    async fn add_dog_and_link_to_user(&self, dog: DogDto) -> Result<DogDto, RepositoryError> {
        let uid = self.current_uid()?;
        let saved = DogDto {
            id: self.store.new_document_id(DOGS_COLLECTION),
            owner_id: uid.clone(),
            ..dog
        };

        self.write_dog(&saved).await.map_err(dog_failure)?;
        self.rewrite_dog_list(&uid, |dog_list| link_new_dog(dog_list, &saved))
            .await
            .map_err(dog_failure)?;
        debug!(dog_id = %saved.id, %uid, "dog added and linked");
        Ok(saved)
    }

    async fn update_dog_and_user(&self, dog: DogDto) -> Result<DogDto, RepositoryError> {
        let uid = self.current_uid()?;
        let owner_id = if dog.owner_id.trim().is_empty() {
            uid.clone()
        } else {
            dog.owner_id.clone()
        };
        let id = if dog.has_blank_id() {
            self.resolve_dog_id(&owner_id, &dog.name).await?
        } else {
            dog.id.clone()
        };
        let resolved = DogDto { id, owner_id, ..dog };

        self.write_dog(&resolved).await.map_err(dog_failure)?;
        self.rewrite_dog_list(&uid, |dog_list| patch_updated_dog(dog_list, &resolved))
            .await
            .map_err(dog_failure)?;
        Ok(resolved)
    }

    async fn delete_dog_and_user(&self, dog_id: &str) -> Result<(), RepositoryError> {
        let uid = self.current_uid()?;
        if dog_id.trim().is_empty() {
            return Err(RepositoryError::dog("Dog id must not be blank"));
        }

        self.store
            .delete(DOGS_COLLECTION, dog_id)
            .await
            .map_err(dog_failure)?;
        self.rewrite_dog_list(&uid, |dog_list| remove_dog(dog_list, dog_id))
            .await
            .map_err(dog_failure)
    }

    async fn save_dog_gardens(
        &self,
        items: Vec<DogGarden>,
    ) -> Result<Vec<DogGarden>, RepositoryError> {
        let mut saved = Vec::with_capacity(items.len());
        for garden in items {
            let garden = if garden.has_blank_id() {
                DogGarden {
                    id: self.store.new_document_id(DOG_GARDENS_COLLECTION),
                    ..garden
                }
            } else {
                garden
            };
            let document = to_document(&garden).map_err(db_failure)?;
            self.store
                .set(DOG_GARDENS_COLLECTION, &garden.id, &document)
                .await
                .map_err(db_failure)?;
            saved.push(garden);
        }
        Ok(saved)
    }

    async fn get_dog_gardens(&self) -> Result<Vec<DogGarden>, RepositoryError> {
        let documents = self
            .store
            .list(DOG_GARDENS_COLLECTION)
            .await
            .map_err(db_failure)?;
        documents
            .iter()
            .map(|document| {
                document.decode::<DogGarden>().map(|garden| {
                    if garden.has_blank_id() {
                        DogGarden {
                            id: document.id.clone(),
                            ..garden
                        }
                    } else {
                        garden
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_failure)
    }

    async fn get_dog_gardens_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<Vec<DogGarden>, RepositoryError> {
        let gardens = self.get_dog_gardens().await?;
        Ok(filter_within_radius(
            gardens,
            &Location::new(latitude, longitude),
            radius_meters,
        ))
    }
}
