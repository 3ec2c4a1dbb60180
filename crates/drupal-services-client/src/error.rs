//! Error types for the services client.

use thiserror::Error;

/// Errors that can occur during session and entity operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response was missing expected fields
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Entity data problem (coercion, kind mismatch)
    #[error(transparent)]
    Model(#[from] drupal_entity_model::ModelError),

    /// Configuration problem
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    State(String),
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;
