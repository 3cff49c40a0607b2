//! `ObjectBackend` over the AWS S3 SDK.
//!
//! Works against AWS itself or any S3-compatible endpoint (MinIO, R2, ...)
//! when `endpoint_url` is set, in which case path-style addressing is used.

use crate::{
    models::object::ObjectSummary,
    services::backend::{BackendError, BackendResult, ObjectBackend, ObjectDownload},
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::Region,
    error::DisplayErrorContext,
    operation::get_object::GetObjectError,
    presigning::PresigningConfig,
    primitives::{ByteStream, DateTime as SmithyDateTime},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Build a client from the default AWS credential chain.
    ///
    /// Call once at startup; the client pools connections and is cheap to clone.
    pub async fn connect(
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint_url: Option<String>,
    ) -> BackendResult<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(BackendError::Config("bucket name is empty".into()));
        }

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint_url {
            debug!(endpoint = %endpoint, "using custom S3 endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::from_client(Client::from_conf(builder.build()), bucket))
    }

    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

fn to_chrono(value: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn list(&self, prefix: Option<&str>) -> BackendResult<Vec<ObjectSummary>> {
        let start = Instant::now();
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_prefix(prefix.map(str::to_string))
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|err| {
                    let message = DisplayErrorContext(&err).to_string();
                    error!(
                        bucket = %self.bucket,
                        prefix = ?prefix,
                        error = %message,
                        "S3 list failed"
                    );
                    BackendError::Service(message)
                })?;

            for obj in resp.contents() {
                let Some(key) = obj.key() else {
                    continue;
                };
                objects.push(ObjectSummary {
                    key: key.to_string(),
                    size: obj.size().unwrap_or(0).max(0) as u64,
                    last_modified: obj.last_modified().and_then(to_chrono),
                    etag: obj.e_tag().map(str::to_string),
                });
            }

            match resp.next_continuation_token() {
                Some(token) if resp.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(
            bucket = %self.bucket,
            prefix = ?prefix,
            count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(objects)
    }

    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> BackendResult<()> {
        let start = Instant::now();
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| {
                let message = DisplayErrorContext(&err).to_string();
                error!(
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    error = %message,
                    "S3 upload failed"
                );
                BackendError::Service(message)
            })?;

        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<ObjectDownload> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let message = DisplayErrorContext(&err).to_string();
                match err.into_service_error() {
                    GetObjectError::NoSuchKey(_) => BackendError::NotFound {
                        key: key.to_string(),
                    },
                    _ => {
                        error!(
                            bucket = %self.bucket,
                            key = %key,
                            error = %message,
                            "S3 get failed"
                        );
                        BackendError::Service(message)
                    }
                }
            })?;

        let content_type = resp.content_type().map(str::to_string);
        let content_length = resp.content_length().and_then(|len| u64::try_from(len).ok());
        let etag = resp.e_tag().map(str::to_string);
        let last_modified = resp.last_modified().and_then(to_chrono);

        // Pull-based: bytes are read from S3 only as the response is polled.
        let body = ReaderStream::new(resp.body.into_async_read());

        Ok(ObjectDownload {
            content_type,
            content_length,
            etag,
            last_modified,
            body: Box::pin(body),
        })
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> BackendResult<String> {
        let presign_err = |reason: String| BackendError::Presign {
            key: key.to_string(),
            reason,
        };

        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|err| presign_err(err.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|err| presign_err(DisplayErrorContext(&err).to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn check(&self) -> BackendResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| BackendError::Service(DisplayErrorContext(&err).to_string()))
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::primitives::SdkBody;
    use aws_smithy_http_client::test_util::{ReplayEvent, StaticReplayClient};
    use axum::http;

    fn test_config() -> aws_sdk_s3::config::Builder {
        aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
                None,
                None,
                "test",
            ))
    }

    fn offline_backend() -> S3Backend {
        S3Backend::from_client(Client::from_conf(test_config().build()), "gallery")
    }

    /// Backend whose HTTP calls are answered, in order, by canned responses.
    fn replay_backend(responses: Vec<(u16, &str)>) -> (S3Backend, StaticReplayClient) {
        let events = responses
            .into_iter()
            .map(|(status, body)| {
                ReplayEvent::new(
                    http::Request::builder()
                        .uri("https://gallery.s3.us-east-1.amazonaws.com/")
                        .body(SdkBody::empty())
                        .unwrap(),
                    http::Response::builder()
                        .status(status)
                        .header("content-type", "application/xml")
                        .body(SdkBody::from(body.to_string()))
                        .unwrap(),
                )
            })
            .collect();
        let http_client = StaticReplayClient::new(events);
        let config = test_config().http_client(http_client.clone()).build();
        (
            S3Backend::from_client(Client::from_conf(config), "gallery"),
            http_client,
        )
    }

    const FIRST_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>gallery</Name>
  <KeyCount>2</KeyCount>
  <MaxKeys>2</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>page-2</NextContinuationToken>
  <Contents>
    <Key>original/1714557600000-cat.png</Key>
    <LastModified>2024-05-01T10:00:00.000Z</LastModified>
    <ETag>&quot;0cc175b9c0f1b6a831c399e269772661&quot;</ETag>
    <Size>1024</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
  <Contents>
    <Key>resized/</Key>
    <LastModified>2024-05-01T09:00:00.000Z</LastModified>
    <Size>0</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
</ListBucketResult>"#;

    const LAST_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>gallery</Name>
  <KeyCount>1</KeyCount>
  <MaxKeys>2</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>resized/cat.png</Key>
    <LastModified>2024-05-01T10:00:05.000Z</LastModified>
    <Size>256</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
</ListBucketResult>"#;

    #[tokio::test]
    async fn list_follows_continuation_tokens_to_the_last_page() {
        let (backend, http_client) = replay_backend(vec![(200, FIRST_PAGE), (200, LAST_PAGE)]);

        let objects = backend.list(None).await.unwrap();

        let keys: Vec<&str> = objects.iter().map(|obj| obj.key.as_str()).collect();
        assert_eq!(
            keys,
            ["original/1714557600000-cat.png", "resized/", "resized/cat.png"]
        );
        assert_eq!(objects[0].size, 1024);
        assert_eq!(
            objects[0].etag.as_deref(),
            Some("\"0cc175b9c0f1b6a831c399e269772661\"")
        );
        assert_eq!(
            objects[2].last_modified.map(|ts| ts.timestamp()),
            Some(1_714_557_605)
        );

        let requests: Vec<&str> = http_client
            .actual_requests()
            .map(|req| req.uri())
            .collect();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].contains("continuation-token"));
        assert!(requests[1].contains("continuation-token=page-2"));
    }

    #[tokio::test]
    async fn missing_keys_map_to_not_found() {
        let (backend, _) = replay_backend(vec![(
            404,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>NoSuchKey</Code>
  <Message>The specified key does not exist.</Message>
  <Key>original/missing.png</Key>
  <RequestId>4442587FB7D0A2F9</RequestId>
</Error>"#,
        )]);

        let err = backend.get("original/missing.png").await.unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("original/missing.png"));
    }

    #[tokio::test]
    async fn other_get_failures_are_service_errors() {
        let (backend, _) = replay_backend(vec![(
            403,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>AccessDenied</Code>
  <Message>Access Denied</Message>
  <RequestId>4442587FB7D0A2F9</RequestId>
</Error>"#,
        )]);

        let err = backend.get("original/secret.png").await.unwrap_err();

        assert!(!err.is_not_found());
        assert!(matches!(
            err,
            BackendError::Service(ref message) if message.contains("AccessDenied")
        ));
    }

    #[tokio::test]
    async fn presigned_urls_are_signed_and_scoped_to_the_key() {
        let backend = offline_backend();
        let url = backend
            .presign_get("resized/cat.png", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("https://"));
        assert!(url.contains("gallery"));
        assert!(url.contains("resized/cat.png"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert_ne!(url, "resized/cat.png");
    }

    #[tokio::test]
    async fn presign_rejects_lifetimes_over_a_week() {
        let backend = offline_backend();
        let err = backend
            .presign_get("a.png", Duration::from_secs(8 * 24 * 60 * 60))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Presign { .. }));
    }

    #[test]
    fn converts_smithy_timestamps() {
        let ts = SmithyDateTime::from_secs_and_nanos(1_714_557_600, 250_000_000);
        let converted = to_chrono(&ts).unwrap();
        assert_eq!(converted.timestamp(), 1_714_557_600);
        assert_eq!(converted.timestamp_subsec_millis(), 250);
    }
}
