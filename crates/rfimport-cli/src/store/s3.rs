//! AWS S3 adapter
//!
//! Lists with the `ListObjectsV2` paginator and signs with SigV4 presigned
//! `GetObject` requests. A `HeadObject` call runs before signing because
//! presigning alone never contacts S3 and would happily sign a missing key.

use super::{ObjectStore, S3Settings};
use crate::error::{CliError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    presigning::PresigningConfig,
    Client,
};
use rfimport_common::{ObjectId, TemporaryUrl};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Short form of an SDK error for user-facing messages: the service error
/// code and message when S3 sent one, the transport cause otherwise. The
/// full context, including the raw response, only goes to the debug log.
fn describe_sdk_error<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: fmt::Debug,
{
    debug!(error = %DisplayErrorContext(err), "S3 request failed");

    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.to_string(),
        _ => match err.source() {
            Some(cause) => format!("{}: {}", err, cause),
            None => err.to_string(),
        },
    }
}

#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub async fn new(settings: &S3Settings) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style);

        if let Some((ref access_key, ref secret_key)) = settings.credentials {
            builder = builder.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "rfimport-config",
            ));
        }

        if let Some(ref endpoint) = settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        debug!(
            region = %settings.region,
            endpoint = ?settings.endpoint,
            "Initialized S3 client"
        );

        Self::from_client(Client::from_conf(builder.build()))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self))]
    async fn list(&self, container: &str) -> Result<Vec<ObjectId>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(container)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        let mut page_count = 0usize;

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                CliError::store_unavailable(format!(
                    "listing s3://{} failed: {}",
                    container,
                    describe_sdk_error(&e)
                ))
            })?;
            page_count += 1;

            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(ObjectId::new(key)?);
                }
            }
        }

        debug!(
            bucket = container,
            objects = keys.len(),
            pages = page_count,
            "Listed S3 bucket"
        );

        Ok(keys)
    }

    #[instrument(skip(self, object_id), fields(object_id = %object_id))]
    async fn sign(
        &self,
        container: &str,
        object_id: &ObjectId,
        ttl: Duration,
    ) -> Result<TemporaryUrl> {
        self.client
            .head_object()
            .bucket(container)
            .key(object_id.as_str())
            .send()
            .await
            .map_err(|e| {
                let reason = match e.as_service_error() {
                    Some(service) if service.is_not_found() => "object not found".to_string(),
                    _ => describe_sdk_error(&e),
                };
                CliError::signing(object_id.as_str(), reason)
            })?;

        let presigning_config = PresigningConfig::expires_in(ttl)
            .map_err(|e| CliError::signing(object_id.as_str(), e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(container)
            .key(object_id.as_str())
            .presigned(presigning_config)
            .await
            .map_err(|e| CliError::signing(object_id.as_str(), describe_sdk_error(&e)))?;

        TemporaryUrl::parse(presigned.uri())
            .map_err(|e| CliError::signing(object_id.as_str(), e.to_string()))
    }

    fn provider(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param, query_param_is_missing},
        Mock, MockServer, ResponseTemplate,
    };

    fn offline_store() -> S3Store {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-2"))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .build();
        S3Store::from_client(Client::from_conf(config))
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(offline_store().provider(), "s3");
    }

    #[tokio::test]
    async fn test_presign_embeds_key_and_expiry() {
        // Presigning is local; this exercises the SDK call shape used by sign().
        let store = offline_store();
        let presigned = store
            .client
            .get_object()
            .bucket("roboflow-images")
            .key("train/cat.jpg")
            .presigned(PresigningConfig::expires_in(Duration::from_secs(3600)).unwrap())
            .await
            .unwrap();

        let url = TemporaryUrl::parse(presigned.uri()).unwrap();
        assert!(url.as_str().contains("train/cat.jpg"));
        assert!(url.as_str().contains("X-Amz-Expires=3600"));
        assert_eq!(url.display_name().as_deref(), Some("cat.jpg"));
    }

    fn mock_store(uri: &str) -> S3Store {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-2"))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .endpoint_url(uri)
            .force_path_style(true)
            .build();
        S3Store::from_client(Client::from_conf(config))
    }

    fn list_page(keys: &[&str], next_token: Option<&str>) -> ResponseTemplate {
        let contents: String = keys
            .iter()
            .map(|key| format!("<Contents><Key>{}</Key><Size>1</Size></Contents>", key))
            .collect();
        let truncation = match next_token {
            Some(token) => format!(
                "<IsTruncated>true</IsTruncated><NextContinuationToken>{}</NextContinuationToken>",
                token
            ),
            None => "<IsTruncated>false</IsTruncated>".to_string(),
        };
        let body = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>photos</Name><KeyCount>{}</KeyCount>{}{}</ListBucketResult>"#,
            keys.len(),
            truncation,
            contents
        );

        ResponseTemplate::new(200)
            .insert_header("content-type", "application/xml")
            .set_body_string(body)
    }

    #[tokio::test]
    async fn test_list_follows_continuation_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/photos/"))
            .and(query_param("list-type", "2"))
            .and(query_param_is_missing("continuation-token"))
            .respond_with(list_page(&["a.jpg", "b.jpg"], Some("tok")))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/photos/"))
            .and(query_param("list-type", "2"))
            .and(query_param("continuation-token", "tok"))
            .respond_with(list_page(&["c.jpg"], None))
            .expect(1)
            .mount(&server)
            .await;

        let keys = mock_store(&server.uri()).list("photos").await.unwrap();
        let keys: Vec<&str> = keys.iter().map(ObjectId::as_str).collect();
        assert_eq!(keys, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn test_list_error_reports_service_code() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/photos/"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(
                        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                         <Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
                    ),
            )
            .mount(&server)
            .await;

        let err = mock_store(&server.uri()).list("photos").await.unwrap_err();
        match err {
            CliError::StoreUnavailable(msg) => {
                assert_eq!(msg, "listing s3://photos failed: AccessDenied: Access Denied");
            }
            other => panic!("expected StoreUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_missing_object_is_signing_error() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/photos/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let object_id = ObjectId::new("gone.jpg").unwrap();
        let err = mock_store(&server.uri())
            .sign("photos", &object_id, Duration::from_secs(60))
            .await
            .unwrap_err();

        assert!(!err.is_fatal());
        match err {
            CliError::Signing { object_id, reason } => {
                assert_eq!(object_id, "gone.jpg");
                assert_eq!(reason, "object not found");
            }
            other => panic!("expected Signing, got {:?}", other),
        }
    }
}
