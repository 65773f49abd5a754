//! Error types for uian.

use thiserror::Error;

/// Result type alias using uian's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for uian operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Clinical case not found
    #[error("Case not found: {0}")]
    CaseNotFound(uuid::Uuid),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid provider configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Answer generation failed. Carries the upstream HTTP status when the
    /// provider returned an error payload, so the API layer can mirror it.
    #[error("Generation error: {message}")]
    Generation {
        status: Option<u16>,
        message: String,
    },

    /// Provider returned a success payload missing the expected answer field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Similarity search failed
    #[error("Search error: {0}")]
    Search(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a generation error without an upstream status.
    pub fn generation(message: impl Into<String>) -> Self {
        Error::Generation {
            status: None,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
