//! Error types shared across rfimport crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised by the shared domain types
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid object identifier: {0}")]
    InvalidObjectId(String),

    #[error("Invalid temporary URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl CommonError {
    /// Create an invalid object identifier error
    pub fn invalid_object_id(msg: impl Into<String>) -> Self {
        Self::InvalidObjectId(msg.into())
    }
}
