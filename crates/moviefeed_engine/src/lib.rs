//! Moviefeed engine: remote catalog access and the async feed/search controllers.
mod catalog;
mod decode;
mod feed;
mod search;
mod types;

pub use catalog::{CatalogClient, CatalogSettings, TmdbCatalogClient};
pub use decode::decode_movie_page;
pub use feed::{FeedController, FetchOutcome, SkipReason};
pub use search::{SearchController, SearchOutcome, SearchSettings, DEFAULT_DEBOUNCE};
pub use types::{FailureKind, TransportError};
