//! rfimport Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the rfimport workspace.
//!
//! # Overview
//!
//! - **Types**: object identifiers, temporary URLs and upload outcomes
//! - **Error Handling**: the common error and result types
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use rfimport_common::{ObjectId, Result, TemporaryUrl};
//!
//! fn name_for(url: &str) -> Result<Option<String>> {
//!     let url = TemporaryUrl::parse(url)?;
//!     Ok(url.display_name())
//! }
//!
//! let id = ObjectId::new("images/cat.jpg").unwrap();
//! assert_eq!(id.as_str(), "images/cat.jpg");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{ObjectId, TemporaryUrl, UploadOutcome};
