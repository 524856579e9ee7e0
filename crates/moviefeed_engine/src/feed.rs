use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use feed_logging::{feed_debug, feed_info, feed_warn};
use moviefeed_core::{
    FeedState, FeedViewModel, FetchApplied, FilterSpec, ItemId, MergeStats, PageTicket,
    FIRST_PAGE,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{CatalogClient, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another page request is still outstanding.
    InFlight,
    AlreadyLoaded,
    /// The displayed item is not the tail of the feed.
    NotLastItem,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Skipped(SkipReason),
    Appended { page: u32, stats: MergeStats },
    Failed(TransportError),
    /// The result arrived after `clear_cache` or `close` and was dropped.
    Discarded,
}

/// Drives one filtered, paginated feed.
///
/// At most one page request is in flight at a time; further calls made while
/// it is outstanding return [`SkipReason::InFlight`] without queueing.
/// Transport failures become state and are never returned as `Err`.
pub struct FeedController {
    client: Arc<dyn CatalogClient>,
    filters: FilterSpec,
    state: Mutex<FeedState>,
    updates: watch::Sender<FeedViewModel>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for FeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedController")
            .field("filters", &self.filters)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl FeedController {
    /// The page carried by `filters` is ignored; the controller owns the cursor.
    pub fn new(client: Arc<dyn CatalogClient>, filters: FilterSpec) -> Self {
        let state = FeedState::new();
        let (updates, _) = watch::channel(state.view());
        Self {
            client,
            filters: filters.with_page(FIRST_PAGE),
            state: Mutex::new(state),
            updates,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn view(&self) -> FeedViewModel {
        self.lock().view()
    }

    /// Receives a fresh [`FeedViewModel`] after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<FeedViewModel> {
        self.updates.subscribe()
    }

    pub async fn load_initial(&self) -> FetchOutcome {
        if !self.lock().items().is_empty() {
            return FetchOutcome::Skipped(SkipReason::AlreadyLoaded);
        }
        self.fetch_next_page().await
    }

    pub async fn fetch_next_page(&self) -> FetchOutcome {
        if self.shutdown.is_cancelled() {
            return FetchOutcome::Skipped(SkipReason::Closed);
        }
        let ticket = self.lock().begin_fetch();
        let Some(ticket) = ticket else {
            return FetchOutcome::Skipped(SkipReason::InFlight);
        };
        let mut in_flight = InFlight {
            controller: self,
            ticket,
            armed: true,
        };
        self.publish();

        let request = self.filters.with_page(ticket.page);
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                in_flight.armed = false;
                return FetchOutcome::Discarded;
            }
            result = self.client.fetch_page(&request) => result,
        };
        in_flight.armed = false;

        let outcome = {
            let mut state = self.lock();
            if self.shutdown.is_cancelled() {
                return FetchOutcome::Discarded;
            }
            match result {
                Ok(items) => match state.complete_fetch(ticket, items) {
                    FetchApplied::Merged(stats) => FetchOutcome::Appended {
                        page: ticket.page,
                        stats,
                    },
                    FetchApplied::Failed | FetchApplied::Stale => FetchOutcome::Discarded,
                },
                Err(err) => match state.fail_fetch(ticket, err.to_string()) {
                    FetchApplied::Failed => {
                        feed_warn!("Page {} failed: {}", ticket.page, err);
                        FetchOutcome::Failed(err)
                    }
                    FetchApplied::Merged(_) | FetchApplied::Stale => FetchOutcome::Discarded,
                },
            }
        };
        if outcome == FetchOutcome::Discarded {
            feed_debug!("Dropped result for page {} after reset", ticket.page);
        }
        self.publish();
        outcome
    }

    /// Re-issues the page that last failed; the cursor did not move.
    pub async fn retry(&self) -> FetchOutcome {
        feed_info!("Retrying page {}", self.lock().page());
        self.fetch_next_page().await
    }

    /// Scroll signal from the caller: fetches the next page only when `id`
    /// is the last accumulated item.
    pub async fn on_item_appeared(&self, id: ItemId) -> FetchOutcome {
        if !self.lock().is_last_item(id) {
            return FetchOutcome::Skipped(SkipReason::NotLastItem);
        }
        self.fetch_next_page().await
    }

    /// Resets items, seen ids and cursor. A fetch still in flight is
    /// discarded when it returns.
    pub fn clear_cache(&self) {
        self.lock().clear();
        feed_info!("Cleared feed cache");
        self.publish();
    }

    /// Pull-to-refresh: `clear_cache` followed by `load_initial`.
    pub async fn refresh(&self) -> FetchOutcome {
        self.clear_cache();
        self.load_initial().await
    }

    /// Tears the feed down. Outstanding fetches never touch state afterwards.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn publish(&self) {
        let view = self.lock().view();
        self.updates.send_replace(view);
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the in-flight slot if the fetch future is dropped mid-request.
struct InFlight<'a> {
    controller: &'a FeedController,
    ticket: PageTicket,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && !self.controller.is_closed() {
            feed_debug!("Fetch for page {} abandoned", self.ticket.page);
            self.controller.lock().abandon_fetch(self.ticket);
            self.controller.publish();
        }
    }
}
