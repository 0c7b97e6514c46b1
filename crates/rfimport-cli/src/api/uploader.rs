//! Single-image submission and response interpretation

use crate::api::client::{DatasetUploadService, HttpResponse};
use crate::api::endpoints;
use crate::config::RoboflowConfig;
use rfimport_common::{TemporaryUrl, UploadOutcome};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Submits temporary URLs to one Roboflow project
pub struct DatasetUploader {
    config: RoboflowConfig,
    service: Box<dyn DatasetUploadService>,
}

impl DatasetUploader {
    pub fn new(config: RoboflowConfig, service: Box<dyn DatasetUploadService>) -> Self {
        Self { config, service }
    }

    pub fn project(&self) -> &str {
        &self.config.project_name
    }

    /// Upload one image by URL.
    ///
    /// `name` defaults to the decoded last path segment of `url`. Exactly one
    /// POST is issued; nothing here retries.
    pub async fn upload(&self, url: &TemporaryUrl, name: Option<&str>, split: &str) -> UploadOutcome {
        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => match url.display_name() {
                Some(derived) => derived,
                None => {
                    warn!(url = %url, "Cannot derive an image name from the URL");
                    return UploadOutcome::failure("missing-name");
                }
            },
        };

        let request_url = endpoints::upload_url(
            &self.config.api_url,
            &self.config.project_name,
            &self.config.api_key,
            &name,
            split,
            url.as_str(),
        );

        let response = match self.service.post(&request_url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(name = %name, error = %e, "Upload request failed");
                return UploadOutcome::failure(format!("request-error: {}", e));
            }
        };

        let outcome = interpret_response(&response);

        match &outcome {
            UploadOutcome::Success { remote_id } => {
                info!(name = %name, remote_id = ?remote_id, project = %self.config.project_name, "Uploaded image")
            }
            UploadOutcome::Duplicate => info!(name = %name, "Duplicate image, not uploaded again"),
            UploadOutcome::Failure { reason } => warn!(name = %name, reason = %reason, "Upload failed"),
        }

        outcome
    }
}

/// Map a raw API response onto an [`UploadOutcome`].
///
/// Only 200 counts as acknowledged. Within a 200, a `duplicate` key wins over
/// `success`, and a body that is not a non-empty JSON object is malformed.
pub fn interpret_response(response: &HttpResponse) -> UploadOutcome {
    if response.status != 200 {
        return UploadOutcome::failure(format!("http-{}: {}", response.status, response.body));
    }

    let body = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(map)) if !map.is_empty() => map,
        Ok(other) => {
            debug!(body = %other, "200 response without a usable JSON object");
            return UploadOutcome::failure("malformed-200");
        }
        Err(e) => {
            debug!(error = %e, "200 response body is not JSON");
            return UploadOutcome::failure("malformed-200");
        }
    };

    if body.contains_key("duplicate") {
        return UploadOutcome::Duplicate;
    }

    if !body.get("success").map(is_truthy).unwrap_or(false) {
        return UploadOutcome::failure("rejected");
    }

    let remote_id = match body.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    UploadOutcome::Success { remote_id }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
