//! Google Cloud Storage provider
//!
//! Signed URLs are V4 signatures. With a service account key they are
//! computed locally; with application default credentials `object_store`
//! falls back to the IAM `signBlob` API.

use super::cloud::CloudBucketStore;
use super::GcsSettings;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};

/// Build the GCS adapter; one client per bucket
pub fn store(settings: GcsSettings) -> CloudBucketStore<GoogleCloudStorage> {
    CloudBucketStore::new("gcs", move |bucket| {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket);

        if let Some(ref path) = settings.service_account_path {
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        builder.build()
    })
}
