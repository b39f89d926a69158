//! Error types for the record store.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Malformed or incomplete input to a write or query operation.
///
/// Each variant names the exact constraint that failed so the message can be
/// returned to the producer unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Payload is not a JSON object.
    #[error("record payload must be a JSON object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field that must hold an integer holds something else.
    #[error("field `{field}` must be an integer, got {found}")]
    NotAnInteger {
        field: &'static str,
        found: String,
    },

    /// A field that must hold a number holds something else.
    #[error("field `{field}` must be a number, got {found}")]
    NotANumber {
        field: &'static str,
        found: String,
    },

    /// A field that must hold text holds something else.
    #[error("field `{field}` must be text, got {found}")]
    NotText {
        field: &'static str,
        found: String,
    },

    /// A numeric field exceeds the accepted magnitude.
    #[error("field `{field}` must be between -{limit} and {limit}, got {found}")]
    OutOfRange {
        field: &'static str,
        limit: f64,
        found: f64,
    },

    /// A required text field is empty or whitespace.
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// Search term is missing or blank.
    #[error("search query `q` must not be empty")]
    EmptyQuery,

    /// Period bounds are reversed.
    #[error("period start {start} is after period end {end}")]
    InvertedPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Core error type for store operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Input rejected before touching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No record has the requested id.
    #[error("record with id {0} not found")]
    NotFound(i64),

    /// No record carries the requested category.
    #[error("no records found in category {0:?}")]
    CategoryEmpty(String),
}

impl StoreError {
    /// Whether this error means the lookup target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::CategoryEmpty(_))
    }
}
