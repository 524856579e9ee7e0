use crate::{CatalogItem, FeedPhase, SearchPhase};

/// Read-only snapshot of a feed, published to observers after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedViewModel {
    pub phase: FeedPhase,
    pub items: Vec<CatalogItem>,
    /// Next page the feed will request.
    pub page: u32,
    pub is_loading: bool,
    pub has_error: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchViewModel {
    pub phase: SearchPhase,
    pub query: String,
    pub last_valid_query: Option<String>,
    pub results: Vec<CatalogItem>,
    pub validation_message: Option<String>,
    pub error_message: Option<String>,
    pub is_loading: bool,
}

impl SearchViewModel {
    /// Explicit "no results" condition, distinct from a failed search.
    pub fn is_empty_result(&self) -> bool {
        self.phase == SearchPhase::Settled(crate::SettledKind::Empty)
    }
}
