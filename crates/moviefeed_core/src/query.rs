/// Minimum number of characters (after trimming) for a searchable query.
pub const MIN_QUERY_LEN: usize = 2;

/// Outcome of validating raw search input.
///
/// `trimmed` is present iff `is_valid`; `message` is present iff not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub trimmed: Option<String>,
    pub message: Option<String>,
}

impl ValidationResult {
    fn valid(trimmed: &str) -> Self {
        Self {
            is_valid: true,
            trimmed: Some(trimmed.to_string()),
            message: None,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            trimmed: None,
            message: Some(message.into()),
        }
    }
}

/// Validates free-text search input against a minimum length.
///
/// Length is counted in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryValidator {
    min_len: usize,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new(MIN_QUERY_LEN)
    }
}

impl QueryValidator {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn validate(&self, raw: &str) -> ValidationResult {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ValidationResult::invalid("Enter a movie title to search");
        }
        if trimmed.chars().count() < self.min_len {
            return ValidationResult::invalid(format!(
                "Search needs at least {} characters",
                self.min_len
            ));
        }
        ValidationResult::valid(trimmed)
    }
}

/// Validate with the default [`MIN_QUERY_LEN`].
pub fn validate(raw: &str) -> ValidationResult {
    QueryValidator::default().validate(raw)
}
