//! Post-authentication orchestration.
//!
//! After sign-in the app locates the user, looks up nearby dog parks, stores
//! them in the shared collection and refreshes the profile so the first dog
//! can be pre-selected for check-in. The profile refresh tolerates the lag
//! between registration writes and reads with fixed-delay retries.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::ViewModelScope;
use crate::domain::ports::{FirebaseRepository, GardensRepository, LocationProvider};
use crate::domain::{DogDto, Location};

const ACQUIRING_LOCATION: &str = "Acquiring location";
const SEARCHING_DOG_PARKS: &str = "Searching dog parks";
const SAVING_DOG_PARKS: &str = "Saving dog parks";
const REFRESHING_PROFILE: &str = "Refreshing profile";
const LOCATION_UNAVAILABLE: &str = "Location unavailable";

/// Pipeline progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAuthState {
    /// Not started.
    Idle,
    /// A stage is running; carries its label.
    Running(String),
    /// Finished; carries the number of gardens saved.
    Success(usize),
    /// Stopped with a user-facing message.
    Error(String),
}

impl PostAuthState {
    /// Return whether the pipeline has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }
}

/// Async clock-independent sleeping abstraction for retries.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for the provided duration.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Port bundle required by the pipeline.
#[derive(Clone)]
pub struct PostAuthPorts {
    /// Firebase repository.
    pub repository: Arc<dyn FirebaseRepository>,
    /// Dog park discovery.
    pub gardens: Arc<dyn GardensRepository>,
    /// Device position.
    pub location: Arc<dyn LocationProvider>,
}

/// Pipeline tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct PostAuthConfig {
    /// Budget for acquiring a position.
    pub location_timeout: Duration,
    /// Dog park search radius in metres.
    pub search_radius_meters: f64,
    /// Language for Places results.
    pub language: String,
    /// Waits before each profile refresh retry.
    pub refresh_delays: Vec<Duration>,
}

impl Default for PostAuthConfig {
    fn default() -> Self {
        Self {
            location_timeout: Duration::from_secs(10),
            search_radius_meters: 5_000.0,
            language: "en".to_owned(),
            refresh_delays: [400, 800, 1_500]
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

struct Pipeline {
    ports: PostAuthPorts,
    config: PostAuthConfig,
    sleeper: Arc<dyn Sleeper>,
    state: watch::Sender<PostAuthState>,
    selected_dog: watch::Sender<Option<DogDto>>,
    // Id of the run allowed to publish; bumped by `run` and `clear`.
    generation: AtomicU64,
}

/// Reducer driving the post-authentication pipeline.
pub struct PostAuthViewModel {
    pipeline: Arc<Pipeline>,
    scope: ViewModelScope,
}

impl PostAuthViewModel {
    /// Create an idle view model that sleeps with Tokio.
    pub fn new(ports: PostAuthPorts, config: PostAuthConfig) -> Self {
        Self::with_sleeper(ports, config, Arc::new(TokioSleeper))
    }

    /// Create an idle view model with an explicit sleeper.
    pub fn with_sleeper(
        ports: PostAuthPorts,
        config: PostAuthConfig,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let (state, _) = watch::channel(PostAuthState::Idle);
        let (selected_dog, _) = watch::channel(None);
        Self {
            pipeline: Arc::new(Pipeline {
                ports,
                config,
                sleeper,
                state,
                selected_dog,
                generation: AtomicU64::new(0),
            }),
            scope: ViewModelScope::default(),
        }
    }

    /// Observe pipeline progress.
    pub fn subscribe(&self) -> watch::Receiver<PostAuthState> {
        self.pipeline.state.subscribe()
    }

    /// Current progress.
    pub fn state(&self) -> PostAuthState {
        self.pipeline.state.borrow().clone()
    }

    /// Dog pre-selected for check-in after the last profile refresh.
    pub fn selected_dog(&self) -> Option<DogDto> {
        self.pipeline.selected_dog.borrow().clone()
    }

    /// Observe the pre-selected dog.
    pub fn subscribe_selected_dog(&self) -> watch::Receiver<Option<DogDto>> {
        self.pipeline.selected_dog.subscribe()
    }

    /// Start the pipeline. `fallback_center` is used when no position can be
    /// acquired. Ignored while a run is in progress.
    pub fn run(&self, fallback_center: Option<Location>) {
        if matches!(*self.pipeline.state.borrow(), PostAuthState::Running(_)) {
            debug!("post-auth run ignored while already running");
            return;
        }
        let run = self.pipeline.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.pipeline
            .state
            .send_replace(PostAuthState::Running(ACQUIRING_LOCATION.to_owned()));
        let pipeline = Arc::clone(&self.pipeline);
        self.scope
            .spawn(async move { pipeline.execute(run, fallback_center).await });
    }

    /// Abort a run in progress and return to `Idle`, so `run` can start a
    /// fresh one.
    pub fn clear(&self) {
        self.pipeline.generation.fetch_add(1, Ordering::SeqCst);
        self.scope.clear();
        self.pipeline.state.send_replace(PostAuthState::Idle);
    }
}

impl Pipeline {
    async fn execute(&self, run: u64, fallback_center: Option<Location>) {
        let next = match self.stages(run, fallback_center).await {
            Ok(saved) => PostAuthState::Success(saved),
            Err(message) => {
                warn!(%message, "post-auth pipeline failed");
                PostAuthState::Error(message)
            }
        };
        self.publish(run, next);
    }

    fn is_current(&self, run: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == run
    }

    fn publish(&self, run: u64, next: PostAuthState) {
        self.state.send_if_modified(|current| {
            if !self.is_current(run) {
                return false;
            }
            *current = next;
            true
        });
    }

    fn report(&self, run: u64, stage: &str) {
        self.publish(run, PostAuthState::Running(stage.to_owned()));
    }

    async fn stages(&self, run: u64, fallback_center: Option<Location>) -> Result<usize, String> {
        self.report(run, ACQUIRING_LOCATION);
        let center = self
            .locate(fallback_center)
            .await
            .ok_or_else(|| LOCATION_UNAVAILABLE.to_owned())?;

        self.report(run, SEARCHING_DOG_PARKS);
        let found = self
            .ports
            .gardens
            .search_dog_parks(
                center.latitude,
                center.longitude,
                self.config.search_radius_meters,
                &self.config.language,
            )
            .await
            .map_err(|error| error.to_string())?;

        self.report(run, SAVING_DOG_PARKS);
        let saved = self
            .ports
            .repository
            .save_dog_gardens(found)
            .await
            .map_err(|error| error.message().to_owned())?;

        self.report(run, REFRESHING_PROFILE);
        self.refresh_profile(run).await;

        info!(saved = saved.len(), "post-auth pipeline finished");
        Ok(saved.len())
    }

    async fn locate(&self, fallback_center: Option<Location>) -> Option<Location> {
        let budget = self.config.location_timeout;
        let acquired =
            tokio::time::timeout(budget, self.ports.location.acquire_location(budget)).await;
        let Ok(acquired) = acquired else {
            warn!(
                ?budget,
                fallback = fallback_center.is_some(),
                "location provider overran its budget"
            );
            return fallback_center;
        };
        match acquired {
            Ok(location) if location.is_valid() => Some(location),
            Ok(location) => {
                warn!(?location, "provider returned an invalid position");
                fallback_center
            }
            Err(error) => {
                warn!(%error, fallback = fallback_center.is_some(), "location acquisition failed");
                fallback_center
            }
        }
    }

    async fn refresh_profile(&self, run: u64) {
        let mut delays = self.config.refresh_delays.iter();
        let mut attempts = 0_usize;
        loop {
            attempts += 1;
            match self.ports.repository.current_user().await {
                Ok(user) if !user.dog_list.is_empty() => {
                    if self.is_current(run) {
                        self.selected_dog.send_replace(user.first_dog().cloned());
                    }
                    return;
                }
                Ok(_) => debug!(attempts, "profile has no dogs yet"),
                Err(error) => debug!(attempts, %error, "profile refresh failed"),
            }
            let Some(delay) = delays.next() else {
                warn!(attempts, "profile refresh retries exhausted");
                return;
            };
            self.sleeper.sleep(*delay).await;
        }
    }
}

#[cfg(test)]
mod tests;
