use moviefeed_core::{CatalogItem, ItemId};
use serde::Deserialize;

use crate::{FailureKind, TransportError};

#[derive(Debug, Deserialize)]
struct MoviePage {
    #[serde(default)]
    results: Vec<MovieRecord>,
}

#[derive(Debug, Deserialize)]
struct MovieRecord {
    id: ItemId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f32>,
}

impl From<MovieRecord> for CatalogItem {
    fn from(record: MovieRecord) -> Self {
        let title = record
            .title
            .or(record.original_title)
            .unwrap_or_default();
        CatalogItem {
            id: record.id,
            title,
            overview: record.overview.filter(|s| !s.is_empty()),
            release_date: record.release_date.filter(|s| !s.is_empty()),
            poster_path: record.poster_path,
            vote_average: record.vote_average,
        }
    }
}

/// Decode a `{ "results": [...] }` movie page, preserving result order.
pub fn decode_movie_page(bytes: &[u8]) -> Result<Vec<CatalogItem>, TransportError> {
    let page: MoviePage = serde_json::from_slice(bytes)
        .map_err(|err| TransportError::new(FailureKind::Decode, err.to_string()))?;
    Ok(page.results.into_iter().map(CatalogItem::from).collect())
}
