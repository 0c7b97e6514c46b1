//! Adapter over the `object_store` crate for providers whose clients are bound
//! to a single bucket or container.
//!
//! `object_store` builders take the container at build time, while
//! [`ObjectStore`] receives it per call, so one client is built lazily per
//! container and cached.

use super::ObjectStore;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::{path::Path as ObjectPath, signer::Signer};
use reqwest::Method;
use rfimport_common::{ObjectId, TemporaryUrl};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, instrument};

/// Anything `object_store` can both list and sign against
pub trait SigningBackend: object_store::ObjectStore + Signer {}

impl<T: object_store::ObjectStore + Signer> SigningBackend for T {}

type BuildFn<B> = dyn Fn(&str) -> object_store::Result<B> + Send + Sync;

/// [`ObjectStore`] implementation for Azure Blob Storage and GCS
pub struct CloudBucketStore<B: SigningBackend> {
    provider: &'static str,
    build: Box<BuildFn<B>>,
    clients: Mutex<HashMap<String, Arc<B>>>,
}

impl<B: SigningBackend> CloudBucketStore<B> {
    /// `build` turns a container name into a configured client
    pub fn new(
        provider: &'static str,
        build: impl Fn(&str) -> object_store::Result<B> + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider,
            build: Box::new(build),
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client(&self, container: &str) -> std::result::Result<Arc<B>, object_store::Error> {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(client) = clients.get(container) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new((self.build)(container)?);
        clients.insert(container.to_string(), Arc::clone(&client));
        debug!(provider = self.provider, container, "Built object_store client");
        Ok(client)
    }
}

#[async_trait]
impl<B: SigningBackend> ObjectStore for CloudBucketStore<B> {
    #[instrument(skip(self), fields(provider = self.provider))]
    async fn list(&self, container: &str) -> Result<Vec<ObjectId>> {
        let client = self.client(container).map_err(|e| {
            CliError::store_unavailable(format!("{} client for '{}': {}", self.provider, container, e))
        })?;

        // object_store pages through the listing internally
        let metas: Vec<object_store::ObjectMeta> = client
            .list(None)
            .try_collect()
            .await
            .map_err(|e| {
                CliError::store_unavailable(format!(
                    "listing {} container '{}' failed: {}",
                    self.provider, container, e
                ))
            })?;

        let keys = metas
            .into_iter()
            .map(|meta| ObjectId::new(meta.location.to_string()))
            .collect::<rfimport_common::Result<Vec<_>>>()?;

        debug!(container, objects = keys.len(), "Listed container");

        Ok(keys)
    }

    #[instrument(skip(self, object_id), fields(provider = self.provider, object_id = %object_id))]
    async fn sign(
        &self,
        container: &str,
        object_id: &ObjectId,
        ttl: Duration,
    ) -> Result<TemporaryUrl> {
        let signing_error = |reason: String| CliError::signing(object_id.as_str(), reason);

        let client = self
            .client(container)
            .map_err(|e| signing_error(e.to_string()))?;

        let path = ObjectPath::parse(object_id.as_str())
            .map_err(|e| signing_error(format!("unsupported key: {}", e)))?;

        client.head(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => signing_error("object not found".to_string()),
            other => signing_error(other.to_string()),
        })?;

        let url = client
            .signed_url(Method::GET, &path, ttl)
            .await
            .map_err(|e| signing_error(e.to_string()))?;

        TemporaryUrl::parse(url.as_str()).map_err(|e| signing_error(e.to_string()))
    }

    fn provider(&self) -> &'static str {
        self.provider
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
    use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_clients_are_cached_per_container() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);

        let store: CloudBucketStore<MicrosoftAzure> = CloudBucketStore::new("azure", move |container| {
            counter.fetch_add(1, Ordering::SeqCst);
            MicrosoftAzureBuilder::new()
                .with_account("rfimportacct")
                .with_access_key("a2V5")
                .with_container_name(container)
                .build()
        });

        store.client("a").unwrap();
        store.client("a").unwrap();
        store.client("b").unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(store.provider(), "azure");
    }

    #[tokio::test]
    async fn test_build_failure_is_store_unavailable() {
        let store: CloudBucketStore<GoogleCloudStorage> = CloudBucketStore::new("gcs", |_| {
            GoogleCloudStorageBuilder::new()
                .with_service_account_key("not json")
                .build()
        });

        let err = store.list("bucket").await.unwrap_err();
        assert!(matches!(err, CliError::StoreUnavailable(_)));
    }
}
