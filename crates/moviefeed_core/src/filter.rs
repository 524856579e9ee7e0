use feed_logging::feed_warn;

/// First page of every feed; pages are 1-based.
pub const FIRST_PAGE: u32 = 1;

/// Query key reserved for the page cursor.
pub const PAGE_KEY: &str = "page";

/// Ordered key/value constraints for a catalog feed plus its page cursor.
///
/// Constraint order is insertion order; setting an existing key replaces its
/// value in place. Two specs with equal constraints describe the same logical
/// feed even when their pages differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    constraints: Vec<(String, String)>,
    page: u32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            constraints: Vec::new(),
            page: FIRST_PAGE,
        }
    }
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSpec::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a constraint. The reserved `page` key is ignored;
    /// use [`FilterSpec::with_page`] for the cursor.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if key == PAGE_KEY {
            feed_warn!("Ignoring reserved filter key '{}'", PAGE_KEY);
            return;
        }
        match self.constraints.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.constraints.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.constraints
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.constraints.iter().position(|(k, _)| k == key)?;
        Some(self.constraints.remove(index).1)
    }

    pub fn constraints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.constraints
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Same constraints, different page. A page of 0 is clamped to [`FIRST_PAGE`].
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            constraints: self.constraints.clone(),
            page: page.max(FIRST_PAGE),
        }
    }

    /// True when both specs target the same logical feed, ignoring page.
    pub fn same_feed(&self, other: &FilterSpec) -> bool {
        self.constraints == other.constraints
    }

    /// Constraints followed by the page cursor, ready for a query string.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.constraints.clone();
        pairs.push((PAGE_KEY.to_string(), self.page.to_string()));
        pairs
    }

    pub fn with_genre(self, genre_id: u32) -> Self {
        self.with("with_genres", genre_id.to_string())
    }

    /// Sort order as understood by the discover endpoint, e.g. `popularity.desc`.
    pub fn sorted_by(self, order: impl Into<String>) -> Self {
        self.with("sort_by", order)
    }

    pub fn released_in(self, year: i32) -> Self {
        self.with("primary_release_year", year.to_string())
    }
}
