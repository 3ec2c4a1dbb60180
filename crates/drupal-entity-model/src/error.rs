//! Error types for the entity data layer.

use thiserror::Error;

/// Errors that can occur while building or coercing entity records.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A field value could not be coerced under strict mode
    #[error("cannot coerce field `{field}` from {value}")]
    Coercion { field: String, value: String },

    /// A wire payload that should have been a JSON object was not
    #[error("expected a JSON object record, got {0}")]
    NotARecord(String),

    /// An entity of one variant was handed to a collection of another
    #[error("entity kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Result type alias using ModelError.
pub type ModelResult<T> = Result<T, ModelError>;
