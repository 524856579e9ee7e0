use crate::view_model::SearchViewModel;
use crate::{CatalogItem, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettledKind {
    Results,
    /// The search succeeded but matched nothing. Not an error.
    Empty,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    PendingValidation,
    Searching,
    Settled(SettledKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStart {
    /// Issue exactly one fetch for this trimmed query.
    Fetch(String),
    Rejected(ValidationResult),
    /// Newer input arrived; do nothing.
    Stale,
}

/// State of one search session.
///
/// Every input bumps `generation`; transitions carrying an older generation
/// are ignored, so only the most recently issued search can change what the
/// caller sees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    query: String,
    last_valid_query: Option<String>,
    results: Vec<CatalogItem>,
    validation_message: Option<String>,
    error: Option<String>,
    is_loading: bool,
    phase: SearchPhase,
    generation: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records new raw input and returns the generation that owns it.
    pub fn input_changed(&mut self, raw: impl Into<String>) -> u64 {
        self.query = raw.into();
        self.is_loading = false;
        self.phase = SearchPhase::PendingValidation;
        self.bump()
    }

    /// Raw input for `generation`, or `None` once superseded.
    pub fn query_for(&self, generation: u64) -> Option<&str> {
        (generation == self.generation).then_some(self.query.as_str())
    }

    pub fn begin_search(&mut self, generation: u64, validation: &ValidationResult) -> SearchStart {
        if generation != self.generation {
            return SearchStart::Stale;
        }
        match validation.trimmed.as_ref().filter(|_| validation.is_valid) {
            Some(trimmed) => {
                self.last_valid_query = Some(trimmed.clone());
                self.validation_message = None;
                self.error = None;
                self.is_loading = true;
                self.phase = SearchPhase::Searching;
                SearchStart::Fetch(trimmed.clone())
            }
            None => {
                self.results.clear();
                self.error = None;
                self.validation_message = validation.message.clone();
                self.is_loading = false;
                self.phase = SearchPhase::Idle;
                SearchStart::Rejected(validation.clone())
            }
        }
    }

    /// Applies a finished fetch. Returns `None` if `generation` was superseded
    /// and the result was discarded.
    pub fn finish_search(
        &mut self,
        generation: u64,
        result: Result<Vec<CatalogItem>, String>,
    ) -> Option<SettledKind> {
        if generation != self.generation {
            return None;
        }
        self.is_loading = false;
        let kind = match result {
            Ok(items) if items.is_empty() => {
                self.results.clear();
                self.error = None;
                SettledKind::Empty
            }
            Ok(items) => {
                self.results = items;
                self.error = None;
                SettledKind::Results
            }
            Err(message) => {
                self.results.clear();
                self.error = Some(message);
                SettledKind::Error
            }
        };
        self.phase = SearchPhase::Settled(kind);
        Some(kind)
    }

    /// Invalidates every outstanding generation without recording new input.
    pub fn supersede(&mut self) -> u64 {
        self.is_loading = false;
        if self.phase == SearchPhase::Searching || self.phase == SearchPhase::PendingValidation {
            self.phase = SearchPhase::Idle;
        }
        self.bump()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn last_valid_query(&self) -> Option<&str> {
        self.last_valid_query.as_deref()
    }

    pub fn results(&self) -> &[CatalogItem] {
        &self.results
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn view(&self) -> SearchViewModel {
        SearchViewModel {
            phase: self.phase,
            query: self.query.clone(),
            last_valid_query: self.last_valid_query.clone(),
            results: self.results.clone(),
            validation_message: self.validation_message.clone(),
            error_message: self.error.clone(),
            is_loading: self.is_loading,
        }
    }

    fn bump(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}
