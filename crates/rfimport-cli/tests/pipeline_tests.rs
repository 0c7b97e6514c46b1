//! Pipeline runs against an in-memory store and a mock Roboflow API
//!
//! These tests validate the incremental import contract:
//! - Only acknowledged objects are recorded
//! - Re-running skips recorded objects
//! - sample_size caps each run in listing order
//! - A corrupt ledger stops the run before anything is uploaded

use async_trait::async_trait;
use indicatif::ProgressBar;
use rfimport_cli::api::{DatasetUploader, ReqwestUploadService};
use rfimport_cli::config::{FilterConfig, RoboflowConfig};
use rfimport_cli::filter::ObjectFilter;
use rfimport_cli::pipeline::{PipelineDriver, PipelineSettings};
use rfimport_cli::store::ObjectStore;
use rfimport_cli::{CliError, Result, UploadLedger};
use rfimport_common::{ObjectId, TemporaryUrl};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Listing-order store whose URLs point at a fixed host
struct InMemoryStore {
    keys: Vec<String>,
}

impl InMemoryStore {
    fn new(keys: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        })
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn list(&self, _container: &str) -> Result<Vec<ObjectId>> {
        self.keys
            .iter()
            .map(|k| ObjectId::new(k.as_str()).map_err(CliError::from))
            .collect()
    }

    async fn sign(&self, container: &str, object_id: &ObjectId, ttl: Duration) -> Result<TemporaryUrl> {
        if !self.keys.iter().any(|k| k == object_id.as_str()) {
            return Err(CliError::signing(object_id.as_str(), "object not found"));
        }
        Ok(TemporaryUrl::parse(&format!(
            "https://{}.blob.test/{}?se={}&sig=x",
            container,
            object_id,
            ttl.as_secs()
        ))?)
    }

    fn provider(&self) -> &'static str {
        "memory"
    }
}

fn driver(store: Arc<InMemoryStore>, sample_size: Option<usize>) -> PipelineDriver {
    PipelineDriver::new(
        store,
        PipelineSettings {
            container: "photos".to_string(),
            filter: ObjectFilter::new(&FilterConfig::default()),
            sample_size,
            split: "train".to_string(),
            url_ttl: Duration::from_secs(3600),
        },
    )
}

fn uploader(server: &MockServer) -> DatasetUploader {
    let config = RoboflowConfig {
        api_key: "key".to_string(),
        project_name: "proj".to_string(),
        api_url: server.uri(),
        timeout_secs: 5,
    };
    DatasetUploader::new(
        config,
        Box::new(ReqwestUploadService::new(Duration::from_secs(5)).unwrap()),
    )
}

async fn mock_reply(server: &MockServer, name: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

fn ledger_keys(path: &Path) -> Vec<String> {
    UploadLedger::load(path)
        .unwrap()
        .iter()
        .map(|id| id.to_string())
        .collect()
}

#[tokio::test]
async fn test_only_acknowledged_objects_are_recorded() {
    let server = MockServer::start().await;
    mock_reply(&server, "a.jpg", 200, json!({"success": true, "id": "1"})).await;
    mock_reply(&server, "b.jpg", 200, json!({"duplicate": true})).await;
    mock_reply(&server, "c.jpg", 403, json!({"error": "forbidden"})).await;
    mock_reply(&server, "d.jpg", 200, json!({"success": false})).await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uploaded_images.json");
    let mut ledger = UploadLedger::load(&path).unwrap();

    let summary = driver(InMemoryStore::new(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]), None)
        .run(&mut ledger, &uploader(&server), &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(ledger_keys(&path), vec!["a.jpg", "b.jpg"]);
}

#[tokio::test]
async fn test_rerun_retries_only_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("name", "flaky.jpg"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uploaded_images.json");
    let store = InMemoryStore::new(&["ok.jpg", "flaky.jpg"]);

    let mut ledger = UploadLedger::load(&path).unwrap();
    let first = driver(Arc::clone(&store), None)
        .run(&mut ledger, &uploader(&server), &ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(first.failed, 1);
    assert_eq!(first.failures[0].reason, "http-500: boom");

    let mut ledger = UploadLedger::load(&path).unwrap();
    let second = driver(Arc::clone(&store), None)
        .run(&mut ledger, &uploader(&server), &ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(second.already_uploaded, 1);
    assert_eq!(second.attempted, 1);
    assert_eq!(second.uploaded, 1);

    let mut ledger = UploadLedger::load(&path).unwrap();
    let third = driver(store, None)
        .run(&mut ledger, &uploader(&server), &ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(third.attempted, 0);
    assert_eq!(ledger_keys(&path), vec!["flaky.jpg", "ok.jpg"]);
}

#[tokio::test]
async fn test_sample_size_uploads_first_listed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uploaded_images.json");
    let mut ledger = UploadLedger::load(&path).unwrap();

    let summary = driver(InMemoryStore::new(&["a.jpg", "b.jpg"]), Some(1))
        .run(&mut ledger, &uploader(&server), &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.deferred, 1);
    assert_eq!(ledger_keys(&path), vec!["a.jpg"]);
}

#[tokio::test]
async fn test_corrupt_ledger_is_not_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uploaded_images.json");
    std::fs::write(&path, "[\"a.jpg\", ").unwrap();

    let err = UploadLedger::load(&path).unwrap_err();
    assert!(matches!(err, CliError::CorruptLedger { .. }));
    assert!(err.is_fatal());

    // Left untouched for the operator to inspect
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\"a.jpg\", ");
}
