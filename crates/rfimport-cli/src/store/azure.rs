//! Azure Blob Storage provider
//!
//! Signed URLs are service SAS tokens, which `object_store` computes locally
//! from the shared account key.

use super::cloud::CloudBucketStore;
use super::AzureSettings;
use crate::config::REDACTED;
use crate::error::{CliError, Result};
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// The parts of an Azure storage connection string the importer uses
#[derive(Clone, PartialEq, Eq)]
pub struct AzureConnectionString {
    pub account_name: String,
    pub account_key: String,
    /// Explicit blob endpoint, or one derived from a non-default suffix
    pub blob_endpoint: Option<String>,
}

impl std::fmt::Debug for AzureConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &REDACTED)
            .field("blob_endpoint", &self.blob_endpoint)
            .finish()
    }
}

impl AzureConnectionString {
    /// Parse `Key=Value;Key=Value` as issued by the Azure portal.
    ///
    /// Values may themselves contain `=` (account keys are base64), so each
    /// segment is split on the first `=` only.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut account_name = None;
        let mut account_key = None;
        let mut blob_endpoint = None;
        let mut protocol = "https".to_string();
        let mut suffix = DEFAULT_ENDPOINT_SUFFIX.to_string();

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                CliError::config(format!("malformed Azure connection string segment '{}'", segment))
            })?;

            match key.trim() {
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                "BlobEndpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "EndpointSuffix" => suffix = value.to_string(),
                _ => {}
            }
        }

        let account_name = account_name
            .ok_or_else(|| CliError::config("Azure connection string has no AccountName"))?;
        let account_key = account_key
            .ok_or_else(|| CliError::config("Azure connection string has no AccountKey"))?;

        if blob_endpoint.is_none() && suffix != DEFAULT_ENDPOINT_SUFFIX {
            blob_endpoint = Some(format!("{}://{}.blob.{}", protocol, account_name, suffix));
        }

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
        })
    }
}

/// Build the Azure adapter; one client per container
pub fn store(settings: AzureSettings) -> CloudBucketStore<MicrosoftAzure> {
    CloudBucketStore::new("azure", move |container| {
        let mut builder = MicrosoftAzureBuilder::from_env()
            .with_account(settings.account.clone())
            .with_container_name(container);

        if let Some(ref key) = settings.access_key {
            builder = builder.with_access_key(key.clone());
        }
        if let Some(ref endpoint) = settings.endpoint {
            builder = builder.with_endpoint(endpoint.clone());
        }

        builder.build()
    })
}
