//! Object store capability
//!
//! The pipeline only needs two things from a cloud provider: the full list of
//! keys in a container and a temporary read URL for one key. [`ObjectStore`]
//! captures that surface; each provider gets an adapter:
//!
//! - [`s3::S3Store`] on the AWS SDK
//! - [`cloud::CloudBucketStore`] on the `object_store` crate, configured for
//!   Azure Blob Storage ([`azure`]) or Google Cloud Storage ([`gcs`])

pub mod azure;
pub mod cloud;
pub mod gcs;
pub mod s3;

use crate::config::REDACTED;
use crate::error::Result;
use async_trait::async_trait;
use rfimport_common::{ObjectId, TemporaryUrl};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Listing and signing surface shared by every provider
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every object in `container`, following pagination to the end.
    ///
    /// Fails with [`CliError::StoreUnavailable`](crate::CliError::StoreUnavailable)
    /// when the provider rejects the request.
    async fn list(&self, container: &str) -> Result<Vec<ObjectId>>;

    /// Produce a URL granting anonymous read access to `object_id` for `ttl`.
    ///
    /// Fails with [`CliError::Signing`](crate::CliError::Signing) when the
    /// object does not exist or the credentials cannot sign for it.
    async fn sign(&self, container: &str, object_id: &ObjectId, ttl: Duration)
        -> Result<TemporaryUrl>;

    /// Short provider name for logs
    fn provider(&self) -> &'static str;
}

/// Resolved provider configuration
#[derive(Debug, Clone)]
pub enum ProviderSettings {
    S3(S3Settings),
    Azure(AzureSettings),
    Gcs(GcsSettings),
}

#[derive(Clone)]
pub struct S3Settings {
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Static (access key id, secret); the default credential chain otherwise
    pub credentials: Option<(String, String)>,
}

#[derive(Clone)]
pub struct AzureSettings {
    pub account: String,
    /// Shared key; without it the `AZURE_*` environment credentials are used
    pub access_key: Option<String>,
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .field(
                "credentials",
                &self.credentials.as_ref().map(|(id, _)| (id, REDACTED)),
            )
            .finish()
    }
}

impl std::fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSettings")
            .field("account", &self.account)
            .field("access_key", &self.access_key.as_ref().map(|_| REDACTED))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GcsSettings {
    /// Service account JSON; application default credentials otherwise
    pub service_account_path: Option<PathBuf>,
}

/// Build the adapter for the configured provider
pub async fn connect(settings: &ProviderSettings) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match settings {
        ProviderSettings::S3(s3) => Arc::new(s3::S3Store::new(s3).await),
        ProviderSettings::Azure(azure) => Arc::new(azure::store(azure.clone())),
        ProviderSettings::Gcs(gcs) => Arc::new(gcs::store(gcs.clone())),
    };

    tracing::debug!(provider = store.provider(), "Object store client ready");

    Ok(store)
}
