//! Selection of listed objects before ledger filtering

use crate::config::FilterConfig;
use rfimport_common::ObjectId;

/// Decides which listed keys are candidate images
#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    prefix: Option<String>,
    extensions: Vec<String>,
}

impl ObjectFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let extensions = config
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self {
            prefix: config.prefix.clone().filter(|p| !p.is_empty()),
            extensions,
        }
    }

    /// Directory placeholders never match; prefix and extension checks apply
    /// only when configured.
    pub fn matches(&self, id: &ObjectId) -> bool {
        if id.is_directory_marker() {
            return false;
        }

        if let Some(ref prefix) = self.prefix {
            if !id.as_str().starts_with(prefix.as_str()) {
                return false;
            }
        }

        if self.extensions.is_empty() {
            return true;
        }

        id.extension()
            .map(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }

    /// Keep matching identifiers in their original order
    pub fn apply(&self, ids: Vec<ObjectId>) -> Vec<ObjectId> {
        ids.into_iter().filter(|id| self.matches(id)).collect()
    }
}
