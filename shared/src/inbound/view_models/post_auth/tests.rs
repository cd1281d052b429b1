//! Unit tests for the post-authentication pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rstest::{fixture, rstest};

use super::{PostAuthConfig, PostAuthPorts, PostAuthState, PostAuthViewModel, Sleeper};
use crate::domain::ports::{
    GardensSourceError, LocationError, LocationProvider, MockFirebaseRepository,
    MockGardensRepository, MockLocationProvider,
};
use crate::domain::{DogDto, DogGarden, Location, RepositoryError, UserDto};

const TEL_AVIV: Location = Location::new(32.0853, 34.7818);

#[derive(Default)]
struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn recorded(&self) -> Vec<Duration> {
        self.calls.lock().expect("sleeper mutex").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().expect("sleeper mutex").push(duration);
    }
}

/// Ignores its timeout and stalls on the first `stalled_calls` requests.
struct StallingLocation {
    stalled_calls: usize,
    calls: Arc<AtomicUsize>,
}

impl StallingLocation {
    fn stalling_first(stalled_calls: usize) -> Self {
        Self {
            stalled_calls,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl LocationProvider for StallingLocation {
    async fn acquire_location(&self, _timeout: Duration) -> Result<Location, LocationError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.stalled_calls {
            tokio::time::sleep(Duration::from_secs(86_400)).await;
        }
        Ok(TEL_AVIV)
    }
}

#[fixture]
fn sleeper() -> Arc<RecordingSleeper> {
    Arc::new(RecordingSleeper::default())
}

fn garden(id: &str) -> DogGarden {
    DogGarden {
        id: id.to_owned(),
        name: format!("Park {id}"),
        location: TEL_AVIV,
        ..DogGarden::default()
    }
}

fn user_with_dogs(names: &[&str]) -> UserDto {
    UserDto {
        email: "dana@example.com".to_owned(),
        name: "Dana".to_owned(),
        dog_list: names
            .iter()
            .map(|name| DogDto {
                id: format!("id-{name}"),
                name: (*name).to_owned(),
                ..DogDto::default()
            })
            .collect(),
    }
}

fn located(location: Option<Location>) -> MockLocationProvider {
    let mut provider = MockLocationProvider::new();
    provider.expect_acquire_location().returning(move |_| {
        location.ok_or_else(|| LocationError::timeout(10_000_u64))
    });
    provider
}

fn finding(gardens: Vec<DogGarden>) -> MockGardensRepository {
    let mut source = MockGardensRepository::new();
    source
        .expect_search_dog_parks()
        .times(1)
        .returning(move |_, _, _, _| Ok(gardens.clone()));
    source
}

fn view_model(
    repository: MockFirebaseRepository,
    gardens: MockGardensRepository,
    location: impl LocationProvider + 'static,
    sleeper: &Arc<RecordingSleeper>,
) -> PostAuthViewModel {
    PostAuthViewModel::with_sleeper(
        PostAuthPorts {
            repository: Arc::new(repository),
            gardens: Arc::new(gardens),
            location: Arc::new(location),
        },
        PostAuthConfig::default(),
        Arc::clone(sleeper) as Arc<dyn Sleeper>,
    )
}

async fn finished(view_model: &PostAuthViewModel) -> PostAuthState {
    let mut rx = view_model.subscribe();
    rx.wait_for(PostAuthState::is_terminal)
        .await
        .expect("pipeline alive")
        .clone()
}

#[rstest]
#[tokio::test]
async fn missing_location_without_fallback_stops_before_search(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository.expect_save_dog_gardens().times(0);
    repository.expect_current_user().times(0);
    let mut gardens = MockGardensRepository::new();
    gardens.expect_search_dog_parks().times(0);
    let view_model = view_model(repository, gardens, located(None), &sleeper);

    view_model.run(None);

    assert_eq!(
        finished(&view_model).await,
        PostAuthState::Error("Location unavailable".to_owned())
    );
    assert_eq!(view_model.selected_dog(), None);
}

#[rstest]
#[tokio::test]
async fn fallback_centre_is_searched_when_location_fails(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository.expect_save_dog_gardens().returning(Ok);
    repository
        .expect_current_user()
        .returning(|| Ok(user_with_dogs(&["Rex"])));
    let mut gardens = MockGardensRepository::new();
    gardens
        .expect_search_dog_parks()
        .withf(|lat, lng, radius, language| {
            (*lat - 31.77).abs() < 1e-9
                && (*lng - 35.21).abs() < 1e-9
                && (*radius - 5_000.0).abs() < 1e-9
                && language == "en"
        })
        .times(1)
        .returning(|_, _, _, _| Ok(vec![garden("p1")]));
    let view_model = view_model(repository, gardens, located(None), &sleeper);

    view_model.run(Some(Location::new(31.77, 35.21)));

    assert_eq!(finished(&view_model).await, PostAuthState::Success(1));
}

#[rstest]
#[tokio::test]
async fn success_saves_gardens_and_selects_the_first_dog(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository
        .expect_save_dog_gardens()
        .withf(|gardens| gardens.len() == 2)
        .times(1)
        .returning(Ok);
    repository
        .expect_current_user()
        .times(1)
        .returning(|| Ok(user_with_dogs(&["Rex", "Luna"])));
    let view_model = view_model(
        repository,
        finding(vec![garden("p1"), garden("p2")]),
        located(Some(TEL_AVIV)),
        &sleeper,
    );

    view_model.run(None);

    assert_eq!(finished(&view_model).await, PostAuthState::Success(2));
    assert_eq!(
        view_model.selected_dog().map(|dog| dog.name),
        Some("Rex".to_owned())
    );
    assert!(sleeper.recorded().is_empty());
}

#[rstest]
#[tokio::test]
async fn empty_profile_is_retried_with_fixed_delays(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository.expect_save_dog_gardens().returning(Ok);
    let mut calls = 0_u32;
    repository.expect_current_user().times(3).returning(move || {
        calls += 1;
        match calls {
            1 => Err(RepositoryError::db("User profile not found")),
            2 => Ok(user_with_dogs(&[])),
            _ => Ok(user_with_dogs(&["Shoko"])),
        }
    });
    let view_model = view_model(
        repository,
        finding(Vec::new()),
        located(Some(TEL_AVIV)),
        &sleeper,
    );

    view_model.run(None);

    assert_eq!(finished(&view_model).await, PostAuthState::Success(0));
    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_millis(400), Duration::from_millis(800)]
    );
    assert_eq!(
        view_model.selected_dog().map(|dog| dog.name),
        Some("Shoko".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn exhausted_refresh_retries_are_not_fatal(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository.expect_save_dog_gardens().returning(Ok);
    repository
        .expect_current_user()
        .times(4)
        .returning(|| Ok(user_with_dogs(&[])));
    let view_model = view_model(
        repository,
        finding(vec![garden("p1")]),
        located(Some(TEL_AVIV)),
        &sleeper,
    );

    view_model.run(None);

    assert_eq!(finished(&view_model).await, PostAuthState::Success(1));
    assert_eq!(
        sleeper.recorded(),
        vec![
            Duration::from_millis(400),
            Duration::from_millis(800),
            Duration::from_millis(1_500),
        ]
    );
    assert_eq!(view_model.selected_dog(), None);
}

#[rstest]
#[tokio::test]
async fn search_failure_skips_saving(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository.expect_save_dog_gardens().times(0);
    let mut gardens = MockGardensRepository::new();
    gardens
        .expect_search_dog_parks()
        .returning(|_, _, _, _| Err(GardensSourceError::timeout("places took too long")));
    let view_model = view_model(repository, gardens, located(Some(TEL_AVIV)), &sleeper);

    view_model.run(None);

    match finished(&view_model).await {
        PostAuthState::Error(message) => assert!(message.contains("places took too long")),
        other => panic!("expected an error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stalled_provider_falls_back_after_the_location_timeout(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository.expect_save_dog_gardens().times(1).returning(Ok);
    repository
        .expect_current_user()
        .returning(|| Ok(user_with_dogs(&["Rex"])));
    let mut gardens = MockGardensRepository::new();
    gardens
        .expect_search_dog_parks()
        .withf(|lat, lng, _, _| (*lat - 31.77).abs() < 1e-9 && (*lng - 35.21).abs() < 1e-9)
        .times(1)
        .returning(|_, _, _, _| Ok(vec![garden("p1")]));
    let view_model = view_model(
        repository,
        gardens,
        StallingLocation::stalling_first(usize::MAX),
        &sleeper,
    );
    let started = tokio::time::Instant::now();

    view_model.run(Some(Location::new(31.77, 35.21)));

    assert_eq!(finished(&view_model).await, PostAuthState::Success(1));
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stalled_provider_without_fallback_reports_location_unavailable(
    sleeper: Arc<RecordingSleeper>,
) {
    let mut gardens = MockGardensRepository::new();
    gardens.expect_search_dog_parks().times(0);
    let view_model = view_model(
        MockFirebaseRepository::new(),
        gardens,
        StallingLocation::stalling_first(usize::MAX),
        &sleeper,
    );

    view_model.run(None);

    assert_eq!(
        finished(&view_model).await,
        PostAuthState::Error("Location unavailable".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn cleared_run_returns_to_idle_and_can_run_again(sleeper: Arc<RecordingSleeper>) {
    let mut repository = MockFirebaseRepository::new();
    repository.expect_save_dog_gardens().times(1).returning(Ok);
    repository
        .expect_current_user()
        .returning(|| Ok(user_with_dogs(&["Rex"])));
    let location = StallingLocation::stalling_first(1);
    let calls = Arc::clone(&location.calls);
    let view_model = view_model(repository, finding(vec![garden("p1")]), location, &sleeper);
    view_model.run(None);
    while calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert!(matches!(view_model.state(), PostAuthState::Running(_)));

    view_model.clear();
    assert_eq!(view_model.state(), PostAuthState::Idle);

    view_model.run(None);

    assert_eq!(finished(&view_model).await, PostAuthState::Success(1));
    assert_eq!(
        view_model.selected_dog().map(|dog| dog.name),
        Some("Rex".to_owned())
    );
}
