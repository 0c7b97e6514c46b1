//! Configuration management for rfimport
//!
//! Settings come from a YAML file (default `config.yaml`), then environment
//! variables (a `.env` file is honoured), then validation. Provider-specific
//! credentials are resolved into [`ProviderSettings`] for the store adapters.

use crate::error::{CliError, Result};
use crate::store::azure::AzureConnectionString;
use crate::store::{AzureSettings, GcsSettings, ProviderSettings, S3Settings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Ledger file used when `uploaded_images_file` is not set.
pub const DEFAULT_LEDGER_PATH: &str = "uploaded_images.json";

/// S3 signing region when `region` is not set.
pub const DEFAULT_REGION: &str = "us-east-2";

/// Dataset split attached to uploads.
pub const DEFAULT_SPLIT: &str = "train";

/// Splits accepted by the dataset service.
pub const VALID_SPLITS: &[&str] = &["train", "valid", "test"];

/// Temporary URL lifetime (1 hour).
pub const DEFAULT_URL_TTL_SECS: u64 = 3600;

/// Longest lifetime every provider accepts for a signed URL (7 days).
pub const MAX_URL_TTL_SECS: u64 = 604_800;

/// Dataset service base URL.
pub const DEFAULT_API_URL: &str = "https://api.roboflow.com";

/// Timeout for a single upload request in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

/// Cloud provider hosting the bucket
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    S3,
    Azure,
    Gcs,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::S3 => f.write_str("s3"),
            Provider::Azure => f.write_str("azure"),
            Provider::Gcs => f.write_str("gcs"),
        }
    }
}

/// Placeholder printed instead of credentials in `Debug` output
pub(crate) const REDACTED: &str = "<redacted>";

/// rfimport configuration file
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: Provider,

    /// Bucket (S3, GCS) or container (Azure) to import from
    #[serde(alias = "container_name", default)]
    pub bucket_name: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom S3-compatible endpoint (MinIO, LocalStack)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub force_path_style: bool,

    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Ledger of already uploaded object keys
    #[serde(default = "default_ledger_path")]
    pub uploaded_images_file: PathBuf,

    /// Maximum number of uploads per run
    #[serde(default)]
    pub sample_size: Option<usize>,

    #[serde(default = "default_split")]
    pub split: String,

    #[serde(default = "default_url_ttl_secs")]
    pub url_ttl_secs: u64,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub gcs: GcsConfig,

    #[serde(default)]
    pub roboflow: RoboflowConfig,
}

/// Which listed objects are eligible for upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub prefix: Option<String>,

    /// Allowed extensions without the dot, compared case-insensitively
    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Clone, Default, Deserialize)]
pub struct AzureConfig {
    #[serde(default)]
    pub connection_string: Option<String>,

    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub access_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GcsConfig {
    #[serde(default)]
    pub service_account_path: Option<PathBuf>,
}

/// Dataset service settings
#[derive(Clone, Deserialize)]
pub struct RoboflowConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub project_name: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RoboflowConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_name: String::new(),
            api_url: default_api_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

// Credentials stay out of logs and error reports.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| REDACTED))
            .field("uploaded_images_file", &self.uploaded_images_file)
            .field("sample_size", &self.sample_size)
            .field("split", &self.split)
            .field("url_ttl_secs", &self.url_ttl_secs)
            .field("filter", &self.filter)
            .field("azure", &self.azure)
            .field("gcs", &self.gcs)
            .field("roboflow", &self.roboflow)
            .finish()
    }
}

impl std::fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConfig")
            .field("connection_string", &self.connection_string.as_ref().map(|_| REDACTED))
            .field("account", &self.account)
            .field("access_key", &self.access_key.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl std::fmt::Debug for RoboflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoboflowConfig")
            .field("api_key", &REDACTED)
            .field("project_name", &self.project_name)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER_PATH)
}

fn default_split() -> String {
    DEFAULT_SPLIT.to_string()
}

fn default_url_ttl_secs() -> u64 {
    DEFAULT_URL_TTL_SECS
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

impl Config {
    /// Load, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::ConfigNotFound(path.display().to_string()));
        }

        dotenvy::dotenv().ok();

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?
            .with_overrides(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            provider = %config.provider,
            bucket = %config.bucket_name,
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Parse YAML without consulting the environment or validating
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("ROBOFLOW_API_KEY") {
            self.roboflow.api_key = key;
        }
        if let Some(project) = lookup("ROBOFLOW_PROJECT_NAME") {
            self.roboflow.project_name = project;
        }
        if let Some(url) = lookup("ROBOFLOW_API_URL") {
            self.roboflow.api_url = url;
        }
        if let Some(conn) = lookup("AZURE_STORAGE_CONNECTION_STRING") {
            self.azure.connection_string = Some(conn);
        }
        if let Some(account) = lookup("AZURE_STORAGE_ACCOUNT") {
            self.azure.account = Some(account);
        }
        if let Some(key) = lookup("AZURE_STORAGE_KEY") {
            self.azure.access_key = Some(key);
        }
        if self.gcs.service_account_path.is_none() {
            if let Some(path) = lookup("GOOGLE_APPLICATION_CREDENTIALS") {
                self.gcs.service_account_path = Some(PathBuf::from(path));
            }
        }
        self
    }

    /// Check required fields and ranges
    pub fn validate(&self) -> Result<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(CliError::config("bucket_name is required"));
        }

        if self.roboflow.api_key.trim().is_empty() {
            return Err(CliError::config(
                "roboflow.api_key is required (or set ROBOFLOW_API_KEY)",
            ));
        }

        if self.roboflow.project_name.trim().is_empty() {
            return Err(CliError::config(
                "roboflow.project_name is required (or set ROBOFLOW_PROJECT_NAME)",
            ));
        }

        if self.roboflow.timeout_secs == 0 {
            return Err(CliError::config("roboflow.timeout_secs must be greater than 0"));
        }

        validate_split(&self.split)?;

        if self.url_ttl_secs == 0 || self.url_ttl_secs > MAX_URL_TTL_SECS {
            return Err(CliError::config(format!(
                "url_ttl_secs must be between 1 and {}, got {}",
                MAX_URL_TTL_SECS, self.url_ttl_secs
            )));
        }

        // Surfaces missing provider credentials before any network call.
        self.provider_settings()?;

        Ok(())
    }

    /// Override the split from the command line
    pub fn set_split(&mut self, split: impl Into<String>) -> Result<()> {
        let split = split.into();
        validate_split(&split)?;
        self.split = split;
        Ok(())
    }

    pub fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl_secs)
    }

    /// Resolve the provider block into adapter settings
    pub fn provider_settings(&self) -> Result<ProviderSettings> {
        match self.provider {
            Provider::S3 => {
                let credentials = match (&self.access_key_id, &self.secret_access_key) {
                    (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
                    (None, None) => None,
                    _ => {
                        return Err(CliError::config(
                            "access_key_id and secret_access_key must be set together",
                        ))
                    }
                };
                Ok(ProviderSettings::S3(S3Settings {
                    region: self.region.clone(),
                    endpoint: self.endpoint.clone(),
                    force_path_style: self.force_path_style,
                    credentials,
                }))
            }
            Provider::Azure => {
                if let Some(ref conn) = self.azure.connection_string {
                    let parsed = AzureConnectionString::parse(conn)?;
                    return Ok(ProviderSettings::Azure(AzureSettings {
                        account: parsed.account_name,
                        access_key: Some(parsed.account_key),
                        endpoint: parsed.blob_endpoint,
                    }));
                }
                let account = self.azure.account.clone().ok_or_else(|| {
                    CliError::config(
                        "azure.connection_string or azure.account is required for provider azure",
                    )
                })?;
                Ok(ProviderSettings::Azure(AzureSettings {
                    account,
                    access_key: self.azure.access_key.clone(),
                    endpoint: None,
                }))
            }
            Provider::Gcs => Ok(ProviderSettings::Gcs(GcsSettings {
                service_account_path: self.gcs.service_account_path.clone(),
            })),
        }
    }
}

fn validate_split(split: &str) -> Result<()> {
    if VALID_SPLITS.contains(&split) {
        Ok(())
    } else {
        Err(CliError::config(format!(
            "split must be one of {}, got '{}'",
            VALID_SPLITS.join(", "),
            split
        )))
    }
}

/// Commented config file written by `rfimport init`
pub fn template(provider: Provider) -> String {
    let provider_block = match provider {
        Provider::S3 => {
            "\
# S3 signing region
region: us-east-2
# Optional S3-compatible endpoint (MinIO, LocalStack)
# endpoint: http://localhost:9000
# force_path_style: true
"
        }
        Provider::Azure => {
            "\
azure:
  # Either a full connection string (or AZURE_STORAGE_CONNECTION_STRING)...
  connection_string: \"DefaultEndpointsProtocol=https;AccountName=YOUR_ACCOUNT;AccountKey=YOUR_KEY;EndpointSuffix=core.windows.net\"
  # ...or an account name plus key (AZURE_STORAGE_ACCOUNT / AZURE_STORAGE_KEY)
  # account: YOUR_ACCOUNT
  # access_key: YOUR_KEY
"
        }
        Provider::Gcs => {
            "\
gcs:
  # Service account JSON (or GOOGLE_APPLICATION_CREDENTIALS)
  service_account_path: path/to/service-account.json
"
        }
    };

    format!(
        "\
provider: {provider}
bucket_name: YOUR_BUCKET_NAME
{provider_block}
# Ledger of object keys already uploaded
uploaded_images_file: {ledger}
# Maximum uploads per run (remove for no limit)
sample_size: 100
split: {split}
url_ttl_secs: {ttl}

filter:
  # prefix: images/
  extensions: [jpg, jpeg, png]

roboflow:
  api_key: YOUR_ROBOFLOW_API_KEY
  project_name: YOUR_ROBOFLOW_PROJECT_NAME
",
        provider = provider,
        provider_block = provider_block,
        ledger = DEFAULT_LEDGER_PATH,
        split = DEFAULT_SPLIT,
        ttl = DEFAULT_URL_TTL_SECS,
    )
}
