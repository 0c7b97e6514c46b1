//! Error types for the rfimport CLI
//!
//! Errors are user-facing: each message says what went wrong and what to try
//! next.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The object store rejected the listing (bad credentials, missing bucket)
    #[error("Object store unavailable: {0}. Check the bucket name and your cloud credentials.")]
    StoreUnavailable(String),

    /// A temporary URL could not be produced for one object
    #[error("Failed to sign '{object_id}': {reason}")]
    Signing { object_id: String, reason: String },

    /// The ledger file exists but cannot be parsed
    #[error("Corrupt upload ledger '{path}': {reason}. Fix or remove the file; refusing to start from an empty ledger because that would re-upload every object.")]
    CorruptLedger { path: String, reason: String },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your config file and environment variables.")]
    Config(String),

    /// The config file does not exist
    #[error("Config file not found: '{0}'. Run 'rfimport init' to create one or pass --config.")]
    ConfigNotFound(String),

    /// `init` would overwrite an existing config
    #[error("Config file '{0}' already exists. Use --force to overwrite it.")]
    AlreadyInitialized(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}. Check the file syntax at the indicated line/column.")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Shared domain type error
    #[error(transparent)]
    Common(#[from] rfimport_common::CommonError),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a store unavailable error
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create a signing error for one object
    pub fn signing(object_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Signing {
            object_id: object_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt ledger error
    pub fn corrupt_ledger(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptLedger {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error must abort a pipeline run.
    ///
    /// Signing failures are scoped to a single object; everything else means
    /// the run cannot continue safely.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Signing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(!CliError::signing("a.jpg", "AccessDenied").is_fatal());
        assert!(CliError::store_unavailable("NoSuchBucket").is_fatal());
        assert!(CliError::corrupt_ledger("ledger.json", "expected array").is_fatal());
    }

    #[test]
    fn test_messages_name_the_object() {
        let err = CliError::signing("photos/a.jpg", "NotFound");
        assert_eq!(err.to_string(), "Failed to sign 'photos/a.jpg': NotFound");
    }
}
