#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};
use std::time::Duration;

use moviefeed_core::{CatalogItem, FilterSpec, ItemId};
use moviefeed_engine::{CatalogClient, FailureKind, TransportError};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feed_logging::initialize_for_tests);
}

pub fn items(ids: impl IntoIterator<Item = ItemId>) -> Vec<CatalogItem> {
    ids.into_iter()
        .map(|id| CatalogItem::new(id, format!("Movie {id}")))
        .collect()
}

pub fn ids(items: &[CatalogItem]) -> Vec<ItemId> {
    items.iter().map(|item| item.id).collect()
}

pub fn network_error() -> TransportError {
    TransportError::new(FailureKind::Network, "connection reset")
}

/// In-process catalog with scripted pages, search answers and latency.
/// Unscripted pages and queries answer with an empty result.
#[derive(Default)]
pub struct ScriptedCatalog {
    pages: HashMap<u32, Vec<CatalogItem>>,
    page_failures: Mutex<HashMap<u32, VecDeque<TransportError>>>,
    searches: HashMap<String, Result<Vec<CatalogItem>, TransportError>>,
    latency: Duration,
    search_latency: HashMap<String, Duration>,
    page_calls: Mutex<Vec<FilterSpec>>,
    search_calls: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, items: Vec<CatalogItem>) -> Self {
        self.pages.insert(page, items);
        self
    }

    /// The next request for `page` fails; later ones use the scripted page.
    pub fn failing_once(self, page: u32) -> Self {
        self.page_failures
            .lock()
            .unwrap()
            .entry(page)
            .or_default()
            .push_back(network_error());
        self
    }

    pub fn with_search(mut self, query: &str, items: Vec<CatalogItem>) -> Self {
        self.searches.insert(query.to_string(), Ok(items));
        self
    }

    pub fn with_search_failure(mut self, query: &str) -> Self {
        self.searches.insert(query.to_string(), Err(network_error()));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_search_latency(mut self, query: &str, latency: Duration) -> Self {
        self.search_latency.insert(query.to_string(), latency);
        self
    }

    pub fn page_calls(&self) -> Vec<FilterSpec> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.page_calls().iter().map(FilterSpec::page).collect()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CatalogClient for ScriptedCatalog {
    async fn fetch_page(&self, filters: &FilterSpec) -> Result<Vec<CatalogItem>, TransportError> {
        self.page_calls.lock().unwrap().push(filters.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let failure = self
            .page_failures
            .lock()
            .unwrap()
            .get_mut(&filters.page())
            .and_then(VecDeque::pop_front);
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(self.pages.get(&filters.page()).cloned().unwrap_or_default())
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<CatalogItem>, TransportError> {
        self.search_calls.lock().unwrap().push(query.to_string());
        let latency = self
            .search_latency
            .get(query)
            .copied()
            .unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.searches
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
