//! Moviefeed core: catalog data model, query validation, page accumulation
//! and the pure state machines behind the feed and search controllers.
mod accumulator;
mod feed_state;
mod filter;
mod item;
mod query;
mod search_state;
mod view_model;

pub use accumulator::{merge, MergeStats, PageAccumulator};
pub use feed_state::{FeedPhase, FeedState, FetchApplied, PageTicket};
pub use filter::{FilterSpec, FIRST_PAGE, PAGE_KEY};
pub use item::{CatalogItem, ItemId};
pub use query::{validate, QueryValidator, ValidationResult, MIN_QUERY_LEN};
pub use search_state::{SearchPhase, SearchStart, SearchState, SettledKind};
pub use view_model::{FeedViewModel, SearchViewModel};
