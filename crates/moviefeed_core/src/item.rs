use std::hash::{Hash, Hasher};

/// Catalog-wide identity of a movie.
pub type ItemId = u64;

/// A movie as returned by the remote catalog.
///
/// Equality and hashing only look at `id`: two fetches of the same movie with
/// differing metadata are the same item.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
}

impl CatalogItem {
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: None,
            release_date: None,
            poster_path: None,
            vote_average: None,
        }
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = Some(overview.into());
        self
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    /// Year component of `release_date` (`YYYY-MM-DD`), if parseable.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.parse().ok())
    }
}

impl PartialEq for CatalogItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CatalogItem {}

impl Hash for CatalogItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
