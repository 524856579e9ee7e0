use feed_logging::feed_debug;

use crate::view_model::FeedViewModel;
use crate::{CatalogItem, ItemId, MergeStats, PageAccumulator, FIRST_PAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPhase {
    #[default]
    Empty,
    Loading,
    Loaded,
    Error,
}

/// Permission to fetch one page, handed out by [`FeedState::begin_fetch`].
///
/// A ticket issued before [`FeedState::clear`] is stale and its result is
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub page: u32,
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    Merged(MergeStats),
    Failed,
    Stale,
}

/// State of one paginated feed.
///
/// The page cursor only moves forward after a successful fetch, so a retry
/// after a failure requests the same page again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    accumulator: PageAccumulator,
    page: u32,
    is_loading: bool,
    is_fetching: bool,
    has_error: bool,
    error: Option<String>,
    epoch: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            accumulator: PageAccumulator::new(),
            page: FIRST_PAGE,
            is_loading: false,
            is_fetching: false,
            has_error: false,
            error: None,
            epoch: 0,
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the single in-flight slot. Returns `None` while another fetch
    /// holds it.
    pub fn begin_fetch(&mut self) -> Option<PageTicket> {
        if self.is_fetching {
            feed_debug!("Fetch for page {} already in flight; dropping request", self.page);
            return None;
        }
        self.is_fetching = true;
        self.is_loading = true;
        self.has_error = false;
        self.error = None;
        Some(PageTicket {
            page: self.page,
            epoch: self.epoch,
        })
    }

    pub fn complete_fetch(&mut self, ticket: PageTicket, items: Vec<CatalogItem>) -> FetchApplied {
        if !self.is_current(ticket) {
            return FetchApplied::Stale;
        }
        let stats = self.accumulator.merge_page(items);
        if stats.skipped > 0 {
            feed_debug!(
                "Page {} dropped {} duplicate item(s)",
                ticket.page,
                stats.skipped
            );
        }
        self.page = ticket.page + 1;
        self.release();
        FetchApplied::Merged(stats)
    }

    pub fn fail_fetch(&mut self, ticket: PageTicket, message: impl Into<String>) -> FetchApplied {
        if !self.is_current(ticket) {
            return FetchApplied::Stale;
        }
        self.has_error = true;
        self.error = Some(message.into());
        self.release();
        FetchApplied::Failed
    }

    /// Releases the in-flight slot without touching items, cursor or error.
    pub fn abandon_fetch(&mut self, ticket: PageTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.release();
        true
    }

    /// Resets items, seen ids and cursor. Any fetch still in flight becomes
    /// stale.
    pub fn clear(&mut self) {
        *self = Self {
            epoch: self.epoch.wrapping_add(1),
            ..Self::default()
        };
    }

    pub fn phase(&self) -> FeedPhase {
        if self.is_loading {
            FeedPhase::Loading
        } else if self.has_error {
            FeedPhase::Error
        } else if self.accumulator.is_empty() {
            FeedPhase::Empty
        } else {
            FeedPhase::Loaded
        }
    }

    /// True when `id` is the last accumulated item, i.e. displaying it should
    /// trigger the next page.
    pub fn is_last_item(&self, id: ItemId) -> bool {
        self.accumulator.last().is_some_and(|item| item.id == id)
    }

    pub fn items(&self) -> &[CatalogItem] {
        self.accumulator.items()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> FeedViewModel {
        FeedViewModel {
            phase: self.phase(),
            items: self.accumulator.items().to_vec(),
            page: self.page,
            is_loading: self.is_loading,
            has_error: self.has_error,
            error_message: self.error.clone(),
        }
    }

    fn is_current(&self, ticket: PageTicket) -> bool {
        self.is_fetching && ticket.epoch == self.epoch
    }

    fn release(&mut self) {
        self.is_fetching = false;
        self.is_loading = false;
    }
}
