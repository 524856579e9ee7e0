use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use feed_logging::{feed_debug, feed_trace, feed_warn};
use moviefeed_core::{
    CatalogItem, QueryValidator, SearchStart, SearchState, SearchViewModel, ValidationResult,
    MIN_QUERY_LEN,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{CatalogClient, TransportError};

/// Settling delay applied to keystrokes before a search is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<CatalogItem>),
    /// The catalog answered with zero matches.
    NoResults,
    Failed(TransportError),
    /// Rejected locally; no request was made.
    Invalid(ValidationResult),
    /// Newer input or teardown overtook this search before it could apply.
    Superseded,
}

/// Debounced, validated search over a [`CatalogClient`].
///
/// Each input bumps a request generation and cancels the previously scheduled
/// search. A search only mutates state if its generation is still current when
/// the response arrives, checked under the same lock that records new input.
///
/// Dropping the last clone tears the session down like [`SearchController::close`].
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<Inner>,
    // Shared by clones only; spawned timers hold `inner` but never this.
    _owner: Arc<DropGuard>,
}

struct Inner {
    client: Arc<dyn CatalogClient>,
    settings: SearchSettings,
    validator: QueryValidator,
    session: Mutex<Session>,
    updates: watch::Sender<SearchViewModel>,
    shutdown: CancellationToken,
    runtime: Handle,
}

#[derive(Default)]
struct Session {
    state: SearchState,
    pending: Option<CancellationToken>,
}

impl Session {
    fn replace_pending(&mut self, parent: &CancellationToken) -> CancellationToken {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }
        let token = parent.child_token();
        self.pending = Some(token.clone());
        token
    }
}

impl std::fmt::Debug for SearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("settings", &self.inner.settings)
            .field("state", &self.inner.lock().state)
            .finish_non_exhaustive()
    }
}

impl SearchController {
    /// Debounce timers are spawned on `runtime`.
    pub fn new(client: Arc<dyn CatalogClient>, settings: SearchSettings, runtime: Handle) -> Self {
        let session = Session::default();
        let (updates, _) = watch::channel(session.state.view());
        let shutdown = CancellationToken::new();
        Self {
            _owner: Arc::new(shutdown.clone().drop_guard()),
            inner: Arc::new(Inner {
                client,
                settings,
                validator: QueryValidator::new(settings.min_query_len),
                session: Mutex::new(session),
                updates,
                shutdown,
                runtime,
            }),
        }
    }

    pub fn view(&self) -> SearchViewModel {
        self.inner.lock().state.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchViewModel> {
        self.inner.updates.subscribe()
    }

    /// Called on every edit. Cancels any pending search and schedules a new
    /// one after the settling delay.
    pub fn on_query_changed(&self, raw: impl Into<String>) {
        if self.is_closed() {
            return;
        }
        let (generation, token) = self.inner.record_input(raw.into());
        self.inner.publish();

        let inner = Arc::clone(&self.inner);
        let delay = inner.settings.debounce;
        self.inner.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    feed_trace!("Debounced search {} cancelled before firing", generation);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            inner.run(generation, token).await;
        });
    }

    /// Explicit submit: validates and searches immediately, bypassing and
    /// superseding any pending debounced search.
    pub async fn search_now(&self, raw: impl Into<String>) -> SearchOutcome {
        if self.is_closed() {
            return SearchOutcome::Superseded;
        }
        let (generation, token) = self.inner.record_input(raw.into());
        self.inner.publish();
        self.inner.run(generation, token).await
    }

    /// Tears the session down: pending and in-flight searches are abandoned
    /// and never touch state again.
    pub fn close(&self) {
        self.inner.shutdown.cancel();
        {
            let mut session = self.inner.lock();
            session.pending = None;
            session.state.supersede();
        }
        self.inner.publish();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl Inner {
    fn record_input(&self, raw: String) -> (u64, CancellationToken) {
        let mut session = self.lock();
        let generation = session.state.input_changed(raw);
        let token = session.replace_pending(&self.shutdown);
        (generation, token)
    }

    async fn run(&self, generation: u64, token: CancellationToken) -> SearchOutcome {
        let start = {
            let mut session = self.lock();
            let validation = match session.state.query_for(generation) {
                Some(raw) => self.validator.validate(raw),
                None => return SearchOutcome::Superseded,
            };
            session.state.begin_search(generation, &validation)
        };
        let query = match start {
            SearchStart::Fetch(query) => query,
            SearchStart::Rejected(validation) => {
                feed_debug!("Search input rejected: {:?}", validation.message);
                self.publish();
                return SearchOutcome::Invalid(validation);
            }
            SearchStart::Stale => return SearchOutcome::Superseded,
        };
        self.publish();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return SearchOutcome::Superseded,
            result = self.client.search_by_text(&query) => result,
        };

        let outcome = {
            let mut session = self.lock();
            if token.is_cancelled() {
                return SearchOutcome::Superseded;
            }
            match result {
                Ok(items) => match session.state.finish_search(generation, Ok(items.clone())) {
                    None => SearchOutcome::Superseded,
                    Some(_) if items.is_empty() => SearchOutcome::NoResults,
                    Some(_) => SearchOutcome::Found(items),
                },
                Err(err) => match session.state.finish_search(generation, Err(err.to_string())) {
                    None => SearchOutcome::Superseded,
                    Some(_) => {
                        feed_warn!("Search for {:?} failed: {}", query, err);
                        SearchOutcome::Failed(err)
                    }
                },
            }
        };
        if outcome == SearchOutcome::Superseded {
            feed_debug!("Discarded stale results for {:?}", query);
        } else {
            self.publish();
        }
        outcome
    }

    fn publish(&self) {
        let view = self.lock().state.view();
        self.updates.send_replace(view);
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
