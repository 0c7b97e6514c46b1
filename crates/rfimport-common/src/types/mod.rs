//! Common types used across rfimport

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Key of one object inside a bucket or container.
///
/// The format is provider-defined and may contain `/` separators. Identifiers
/// are never empty; deserialization rejects empty strings so a ledger holding
/// one is reported as corrupt instead of being accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CommonError::invalid_object_id("object key must not be empty"));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for zero-byte "folder" placeholders such as `images/`.
    pub fn is_directory_marker(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Lowercased extension of the final path segment, if any.
    pub fn extension(&self) -> Option<String> {
        let file_name = self.0.rsplit('/').next()?;
        let (stem, ext) = file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl TryFrom<String> for ObjectId {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Time-limited URL granting anonymous read access to one object
/// (S3 presigned URL, Azure SAS URL, GCS V4 signed URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryUrl(Url);

impl TemporaryUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        Url::parse(raw)
            .map(Self)
            .map_err(|source| CommonError::InvalidUrl {
                url: raw.to_string(),
                source,
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Name derived from the last path segment, ignoring the query string.
    ///
    /// The segment is percent-decoded so that callers re-encoding it for a
    /// query string do not double-encode. Returns `None` when the URL has no
    /// non-empty final segment.
    pub fn display_name(&self) -> Option<String> {
        let segment = self.0.path_segments()?.next_back()?;
        if segment.is_empty() {
            return None;
        }
        let decoded = urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        Some(decoded)
    }
}

impl std::fmt::Display for TemporaryUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Result of one upload attempt against the dataset service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Accepted; the service may or may not report the new image id
    Success { remote_id: Option<String> },
    /// The service already holds this image
    Duplicate,
    /// Rejected or unreadable response; retried on a later run
    Failure { reason: String },
}

impl UploadOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Whether the object should be recorded as uploaded.
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Duplicate)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Duplicate => "duplicate",
            Self::Failure { .. } => "failure",
        }
    }
}

impl std::fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success {
                remote_id: Some(id),
            } => write!(f, "success ({})", id),
            Self::Success { remote_id: None } => write!(f, "success"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::Failure { reason } => write!(f, "failure: {}", reason),
        }
    }
}
