//! Published state shared by the form-driven view models.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::debug;

/// Lifecycle of a form-backed screen.
///
/// `Initial` carries the editable form snapshot, including validation errors
/// from the last rejected submit. `Loading` covers the single in-flight
/// repository call. `Loaded` and `Error` are terminal for that submit.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<F, L> {
    /// Editable form.
    Initial(F),
    /// A submit is in flight.
    Loading,
    /// The last submit succeeded.
    Loaded(L),
    /// The last submit failed with a user-facing message.
    Error(String),
}

impl<F, L> ViewState<F, L> {
    /// Return whether a submit is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Return whether the state ends a submit.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Error(_))
    }

    /// Form snapshot when editable.
    pub fn form(&self) -> Option<&F> {
        match self {
            Self::Initial(form) => Some(form),
            _ => None,
        }
    }

    /// Loaded payload, if any.
    pub fn loaded(&self) -> Option<&L> {
        match self {
            Self::Loaded(loaded) => Some(loaded),
            _ => None,
        }
    }

    /// Error message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Form snapshots carry their own validation errors.
pub(crate) trait FormSnapshot: Clone + Default + Send + Sync + 'static {
    fn set_errors(&mut self, errors: Vec<String>);
}

/// Tasks owned by one view model, aborted on `clear` and on drop.
#[derive(Default)]
pub(crate) struct ViewModelScope {
    tasks: Mutex<JoinSet<()>>,
}

impl ViewModelScope {
    pub(crate) fn spawn<Fut>(&self, task: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    pub(crate) fn clear(&self) {
        self.lock().abort_all();
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publishes a submit's outcome only while it is still the current one.
///
/// `clear` and `reset` bump the generation, so a task that was aborted while
/// running cannot overwrite the state published after it.
struct Publisher<F, L> {
    state: watch::Sender<ViewState<F, L>>,
    generation: AtomicU64,
}

impl<F, L> Publisher<F, L> {
    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn publish_for(&self, run: u64, next: ViewState<F, L>) {
        self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != run {
                return false;
            }
            *current = next;
            true
        });
    }
}

/// Form snapshot, published state and task scope for one screen.
pub(crate) struct FormStore<F, L> {
    publisher: Arc<Publisher<F, L>>,
    form: Mutex<F>,
    scope: ViewModelScope,
}

impl<F, L> FormStore<F, L>
where
    F: FormSnapshot,
    L: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ViewState::Initial(F::default()));
        Self {
            publisher: Arc::new(Publisher {
                state,
                generation: AtomicU64::new(0),
            }),
            form: Mutex::new(F::default()),
            scope: ViewModelScope::default(),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ViewState<F, L>> {
        self.publisher.state.subscribe()
    }

    pub(crate) fn current(&self) -> ViewState<F, L> {
        self.publisher.state.borrow().clone()
    }

    pub(crate) fn form(&self) -> F {
        self.lock_form().clone()
    }

    /// Apply a field change. While loading only the snapshot changes; in any
    /// other state the snapshot is republished as `Initial`.
    pub(crate) fn edit(&self, apply: impl FnOnce(&mut F)) {
        let snapshot = {
            let mut form = self.lock_form();
            apply(&mut form);
            form.set_errors(Vec::new());
            form.clone()
        };
        if self.publisher.state.borrow().is_loading() {
            return;
        }
        self.publisher.state.send_replace(ViewState::Initial(snapshot));
    }

    /// Validate the snapshot and, when clean, run `work` on the scope.
    pub(crate) fn submit<Fut>(
        &self,
        validate: impl FnOnce(&F) -> Vec<String>,
        work: impl FnOnce(F) -> Fut,
    ) where
        Fut: Future<Output = Result<L, String>> + Send + 'static,
    {
        if self.publisher.state.borrow().is_loading() {
            debug!("submit ignored while a request is in flight");
            return;
        }

        let (snapshot, rejected) = {
            let mut form = self.lock_form();
            let errors = validate(&form);
            let rejected = !errors.is_empty();
            form.set_errors(errors);
            (form.clone(), rejected)
        };
        if rejected {
            self.publisher.state.send_replace(ViewState::Initial(snapshot));
            return;
        }
        self.launch(work(snapshot));
    }

    fn launch<Fut>(&self, work: Fut)
    where
        Fut: Future<Output = Result<L, String>> + Send + 'static,
    {
        let run = self.publisher.begin();
        self.publisher.state.send_replace(ViewState::Loading);
        let publisher = Arc::clone(&self.publisher);
        self.scope.spawn(async move {
            let next = match work.await {
                Ok(loaded) => ViewState::Loaded(loaded),
                Err(message) => ViewState::Error(message),
            };
            publisher.publish_for(run, next);
        });
    }

    pub(crate) fn replace_form(&self, form: F) {
        *self.lock_form() = form.clone();
        if !self.publisher.state.borrow().is_loading() {
            self.publisher.state.send_replace(ViewState::Initial(form));
        }
    }

    pub(crate) fn reset(&self) {
        self.publisher.invalidate();
        self.scope.clear();
        *self.lock_form() = F::default();
        self.publisher.state.send_replace(ViewState::Initial(F::default()));
    }

    /// Abort in-flight work. A submit that was loading hands the screen
    /// back to the last form snapshot so it can be submitted again.
    pub(crate) fn clear(&self) {
        self.publisher.invalidate();
        self.scope.clear();
        if self.publisher.state.borrow().is_loading() {
            self.publisher
                .state
                .send_replace(ViewState::Initial(self.form()));
        }
    }

    fn lock_form(&self) -> MutexGuard<'_, F> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct NoteForm {
        text: String,
        errors: Vec<String>,
    }

    impl FormSnapshot for NoteForm {
        fn set_errors(&mut self, errors: Vec<String>) {
            self.errors = errors;
        }
    }

    fn require_text(form: &NoteForm) -> Vec<String> {
        if form.text.is_empty() {
            vec!["Text is required".to_owned()]
        } else {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn rejected_submit_stays_initial_with_errors() {
        let store: FormStore<NoteForm, String> = FormStore::new();

        store.submit(require_text, |_| async { Ok("never".to_owned()) });

        let state = store.current();
        assert_eq!(
            state.form().map(|form| form.errors.clone()),
            Some(vec!["Text is required".to_owned()])
        );
    }

    #[tokio::test]
    async fn submit_publishes_loading_then_one_terminal_state() {
        let store: FormStore<NoteForm, String> = FormStore::new();
        let mut rx = store.subscribe();
        store.edit(|form| form.text = "hello".to_owned());

        store.submit(require_text, |form| async move { Ok(form.text.to_uppercase()) });

        let state = rx
            .wait_for(ViewState::is_terminal)
            .await
            .expect("state published")
            .clone();
        assert_eq!(state, ViewState::Loaded("HELLO".to_owned()));
    }

    #[tokio::test]
    async fn submits_while_loading_are_ignored() {
        let store: FormStore<NoteForm, u32> = FormStore::new();
        store.edit(|form| form.text = "x".to_owned());
        let (release, gate) = oneshot::channel::<()>();

        store.submit(require_text, |_| async move {
            let _ = gate.await;
            Ok(1)
        });
        store.submit(require_text, |_| async { Ok(2) });
        assert!(store.current().is_loading());

        release.send(()).expect("task waiting");
        let mut rx = store.subscribe();
        let state = rx.wait_for(ViewState::is_terminal).await.expect("published").clone();
        assert_eq!(state, ViewState::Loaded(1));
    }

    #[tokio::test]
    async fn edits_after_error_republish_the_snapshot() {
        let store: FormStore<NoteForm, u32> = FormStore::new();
        store.edit(|form| form.text = "draft".to_owned());
        store.submit(require_text, |_| async { Err("offline".to_owned()) });
        let mut rx = store.subscribe();
        rx.wait_for(ViewState::is_terminal).await.expect("published");

        store.edit(|form| form.text.push('!'));

        assert_eq!(
            store.current().form().map(|form| form.text.clone()),
            Some("draft!".to_owned())
        );
    }

    #[tokio::test]
    async fn clear_aborts_in_flight_work() {
        let store: FormStore<NoteForm, u32> = FormStore::new();
        store.edit(|form| form.text = "x".to_owned());
        store.submit(require_text, |_| async {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok(1)
        });

        store.clear();
        tokio::task::yield_now().await;

        assert_eq!(
            store.current().form().map(|form| form.text.clone()),
            Some("x".to_owned())
        );
    }

    #[tokio::test]
    async fn cleared_submit_can_be_retried() {
        let store: FormStore<NoteForm, u32> = FormStore::new();
        store.edit(|form| form.text = "x".to_owned());
        store.submit(require_text, |_| async {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok(1)
        });
        store.clear();

        store.submit(require_text, |_| async { Ok(2) });

        let mut rx = store.subscribe();
        let state = rx.wait_for(ViewState::is_terminal).await.expect("published").clone();
        assert_eq!(state, ViewState::Loaded(2));
    }

    #[tokio::test]
    async fn stale_outcome_is_not_published_after_clear() {
        let store: FormStore<NoteForm, u32> = FormStore::new();
        let publisher = Arc::clone(&store.publisher);
        let run = publisher.begin();

        store.clear();
        publisher.publish_for(run, ViewState::Loaded(7));

        assert!(store.current().loaded().is_none());
    }
}
