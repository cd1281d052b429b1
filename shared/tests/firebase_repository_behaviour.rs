//! Behavioural tests for the Firebase repository over in-memory adapters.
//!
//! The in-memory auth gateway and document store stand in for Identity
//! Toolkit and Firestore, so these tests observe exactly what the repository
//! writes to each collection.

use std::sync::Arc;

use pupfiesta::domain::ports::{
    AuthGateway, DOG_GARDENS_COLLECTION, DOGS_COLLECTION, DocumentStore, FirebaseRepository,
    USERS_COLLECTION,
};
use pupfiesta::domain::{
    DogBreed, DogDto, DogGarden, Location, RemoteFirebaseRepository, RepositoryError, UserDto,
};
use pupfiesta::outbound::memory::{InMemoryAuthGateway, InMemoryDocumentStore};
use rstest::{fixture, rstest};
use serde_json::json;

const EMAIL: &str = "dana@example.com";
const PASSWORD: &str = "secret1";

struct Harness {
    auth: Arc<InMemoryAuthGateway>,
    store: Arc<InMemoryDocumentStore>,
    repository: RemoteFirebaseRepository<InMemoryAuthGateway, InMemoryDocumentStore>,
}

impl Harness {
    fn uid(&self) -> String {
        self.auth.current_user().expect("signed in").uid
    }

    async fn stored_user(&self) -> UserDto {
        self.store
            .get(USERS_COLLECTION, &self.uid())
            .await
            .expect("store readable")
            .expect("profile exists")
            .decode()
            .expect("profile decodes")
    }

    async fn stored_dog_count(&self) -> usize {
        self.store
            .list(DOGS_COLLECTION)
            .await
            .expect("store readable")
            .len()
    }
}

#[fixture]
fn harness() -> Harness {
    let auth = Arc::new(InMemoryAuthGateway::new());
    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = RemoteFirebaseRepository::new(Arc::clone(&auth), Arc::clone(&store));
    Harness {
        auth,
        store,
        repository,
    }
}

fn dog(name: &str) -> DogDto {
    DogDto {
        name: name.to_owned(),
        breed: DogBreed::Beagle,
        weight: 11.5,
        ..DogDto::default()
    }
}

async fn registered(harness: &Harness, dogs: Vec<DogDto>) -> UserDto {
    harness
        .repository
        .user_registration(EMAIL, PASSWORD, "Dana", dogs)
        .await
        .expect("registration succeeds")
}

#[rstest]
#[tokio::test]
async fn registration_writes_dogs_then_profile(harness: Harness) {
    let user = registered(&harness, vec![dog("Rex"), dog("Luna")]).await;

    let uid = harness.uid();
    assert_eq!(user.dog_list.len(), 2);
    assert!(user.dog_list.iter().all(|dog| !dog.has_blank_id()));
    assert!(user.dog_list.iter().all(|dog| dog.owner_id == uid));
    assert_eq!(harness.stored_dog_count().await, 2);
    assert_eq!(harness.stored_user().await, user);
    assert_eq!(harness.repository.current_user().await, Ok(user));
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_is_an_auth_error(harness: Harness) {
    registered(&harness, Vec::new()).await;

    let result = harness
        .repository
        .user_registration(EMAIL, PASSWORD, "Dana again", vec![dog("Rex")])
        .await;

    assert!(matches!(result, Err(RepositoryError::Auth { .. })));
    assert_eq!(harness.stored_dog_count().await, 0);
}

#[rstest]
#[tokio::test]
async fn added_dog_gets_an_id_and_exactly_one_mirror_entry(harness: Harness) {
    registered(&harness, Vec::new()).await;
    let uid = harness.uid();
    harness
        .store
        .set(
            USERS_COLLECTION,
            &uid,
            &json!({
                "email": EMAIL,
                "name": "Dana",
                "dogList": [{ "id": "", "name": "Shoko", "ownerId": uid }],
            }),
        )
        .await
        .expect("legacy profile written");

    let saved = harness
        .repository
        .add_dog_and_link_to_user(dog("Shoko"))
        .await
        .expect("dog added");

    assert!(!saved.has_blank_id());
    assert_eq!(saved.owner_id, uid);
    let dog_list = harness.stored_user().await.dog_list;
    assert_eq!(dog_list.len(), 1);
    assert_eq!(dog_list.iter().filter(|entry| entry.id == saved.id).count(), 1);
    assert!(dog_list.iter().all(|entry| !entry.has_blank_id()));
}

#[rstest]
#[tokio::test]
async fn blank_id_update_resolves_the_stored_dog_by_name(harness: Harness) {
    let user = registered(&harness, vec![dog("Rex")]).await;
    let stored_id = user.dog_list.first().expect("one dog").id.clone();

    let updated = harness
        .repository
        .update_dog_and_user(DogDto {
            weight: 13.0,
            ..dog("Rex")
        })
        .await
        .expect("update succeeds");

    assert_eq!(updated.id, stored_id);
    assert_eq!(harness.stored_dog_count().await, 1);
    let mirrored = harness.stored_user().await.dog_list;
    assert_eq!(mirrored.len(), 1);
    assert!(mirrored.iter().all(|entry| (entry.weight - 13.0).abs() < f64::EPSILON));
}

#[rstest]
#[tokio::test]
async fn unresolved_update_is_a_dog_error(harness: Harness) {
    registered(&harness, vec![dog("Rex")]).await;

    let result = harness.repository.update_dog_and_user(dog("Ghost")).await;

    match result {
        Err(error @ RepositoryError::Dog { .. }) => {
            assert!(error.message().contains("could not be resolved"));
        }
        other => panic!("expected a dog error, got {other:?}"),
    }
    assert_eq!(harness.stored_dog_count().await, 1);
}

#[rstest]
#[tokio::test]
async fn deleted_dog_leaves_both_collections(harness: Harness) {
    let user = registered(&harness, vec![dog("Rex"), dog("Luna")]).await;
    let rex = user.dog_list.first().expect("two dogs").id.clone();

    harness
        .repository
        .delete_dog_and_user(&rex)
        .await
        .expect("delete succeeds");

    let dogs = harness.repository.get_user_dogs().await.expect("dogs listed");
    assert_eq!(dogs.len(), 1);
    assert!(dogs.iter().all(|dog| dog.name == "Luna"));
    let mirrored = harness.stored_user().await.dog_list;
    assert!(mirrored.iter().all(|entry| entry.id != rex));
}

#[rstest]
#[tokio::test]
async fn dog_operations_require_a_session(harness: Harness) {
    registered(&harness, Vec::new()).await;
    harness.repository.sign_out().await.expect("sign out");

    let result = harness.repository.add_dog_and_link_to_user(dog("Rex")).await;

    assert_eq!(result, Err(RepositoryError::auth("No authenticated user")));
}

#[rstest]
#[tokio::test]
async fn wrong_password_is_an_auth_error(harness: Harness) {
    registered(&harness, Vec::new()).await;
    harness.repository.sign_out().await.expect("sign out");

    let result = harness.repository.user_login(EMAIL, "not-it").await;

    assert!(matches!(result, Err(RepositoryError::Auth { .. })));
}

#[rstest]
#[tokio::test]
async fn profile_update_keeps_the_dog_list(harness: Harness) {
    registered(&harness, vec![dog("Rex")]).await;

    let updated = harness
        .repository
        .update_user_profile("Dana Levi", "dana.levi@example.com")
        .await
        .expect("profile updated");

    assert_eq!(updated.name, "Dana Levi");
    assert_eq!(updated.email, "dana.levi@example.com");
    assert_eq!(updated.dog_list.len(), 1);
    assert_eq!(harness.stored_user().await, updated);
}

#[rstest]
#[tokio::test]
async fn garden_without_id_round_trips_with_a_generated_id(harness: Harness) {
    let garden = DogGarden {
        name: "Meir Park".to_owned(),
        location: Location::new(32.0731, 34.7748),
        ..DogGarden::default()
    };

    let saved = harness
        .repository
        .save_dog_gardens(vec![garden])
        .await
        .expect("gardens saved");
    let listed = harness.repository.get_dog_gardens().await.expect("gardens listed");

    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|garden| !garden.has_blank_id()));
    assert_eq!(listed, saved);
    assert_eq!(
        harness
            .store
            .list(DOG_GARDENS_COLLECTION)
            .await
            .expect("store readable")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn nearby_gardens_are_filtered_by_distance(harness: Harness) {
    let centre = Location::new(0.0, 0.0);
    let near = DogGarden {
        id: "near".to_owned(),
        location: Location::new(0.0, 0.0089),
        ..DogGarden::default()
    };
    let far = DogGarden {
        id: "far".to_owned(),
        location: Location::new(0.0, 0.01),
        ..DogGarden::default()
    };
    harness
        .repository
        .save_dog_gardens(vec![near.clone(), far])
        .await
        .expect("gardens saved");

    let found = harness
        .repository
        .get_dog_gardens_near(centre.latitude, centre.longitude, 1_000.0)
        .await
        .expect("gardens listed");

    assert_eq!(found, vec![near]);
}
