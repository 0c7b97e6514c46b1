//! HTTP transport for the dataset API
//!
//! The uploader only needs "POST this URL, give me status and body", so the
//! transport sits behind [`DatasetUploadService`] and tests can swap it out.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Raw response from the dataset API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Outbound POST capability consumed by the uploader
#[async_trait]
pub trait DatasetUploadService: Send + Sync {
    /// POST to `url` with an empty body.
    ///
    /// Any HTTP status is a successful return; only transport failures
    /// (DNS, connect, timeout) are errors.
    async fn post(&self, url: &str) -> Result<HttpResponse>;
}

/// [`DatasetUploadService`] backed by `reqwest`
pub struct ReqwestUploadService {
    client: Client,
}

impl ReqwestUploadService {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rfimport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DatasetUploadService for ReqwestUploadService {
    async fn post(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.post(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}
