use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use bytes::BytesMut;
use futures::TryStreamExt;
use std::env;

use crate::{
    byte_stream, BlobError, BlobResult, BlobStore, ByteStream, DeleteOutcome, GetResult,
    ObjectHead, PutResult,
};

/// Connection settings for any S3-compatible endpoint (RustFS, MinIO, AWS)
#[derive(Debug, Clone)]
pub struct S3Config {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint_url: String,
    pub bucket: String,
}

impl S3Config {
    /// Reads `S3_REGION`, `S3_ACCESS_KEY_ID`, `S3_SECRET_ACCESS_KEY`,
    /// `S3_ENDPOINT_URL` and `S3_BUCKET` (default `shelf-assets`).
    pub fn from_env() -> BlobResult<Self> {
        fn get_env(key: &str) -> BlobResult<String> {
            env::var(key)
                .map_err(|_| BlobError::invalid(format!("{} environment variable required", key)))
        }

        Ok(Self {
            region: get_env("S3_REGION")?,
            access_key_id: get_env("S3_ACCESS_KEY_ID")?,
            secret_access_key: get_env("S3_SECRET_ACCESS_KEY")?,
            endpoint_url: get_env("S3_ENDPOINT_URL")?,
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "shelf-assets".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct S3CompatibleStore {
    client: Client,
    bucket: String,
    endpoint_url: String,
}

impl S3CompatibleStore {
    pub async fn connect(config: S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "shelf",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint_url.clone())
            .load()
            .await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true)
                .build(),
        );

        Self {
            client,
            bucket: config.bucket,
            endpoint_url: config.endpoint_url,
        }
    }

    pub async fn from_env() -> BlobResult<Self> {
        Ok(Self::connect(S3Config::from_env()?).await)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> BlobError {
        BlobError::backend(err)
    }
}

#[async_trait]
impl BlobStore for S3CompatibleStore {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult> {
        let data = stream
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await?
            .freeze();
        let size_bytes = data.len() as u64;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(AwsByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let result = request.send().await.map_err(Self::map_aws_error)?;

        Ok(PutResult {
            etag: result.e_tag().map(str::to_string),
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        let result = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(result) => result,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false);
                return Err(if missing {
                    BlobError::not_found(key)
                } else {
                    Self::map_aws_error(err)
                });
            }
        };

        let content_type = result.content_type().map(str::to_string);
        let etag = result.e_tag().map(str::to_string);
        let body = result.body.collect().await.map_err(Self::map_aws_error)?;
        let bytes = body.into_bytes();

        Ok(GetResult {
            size_bytes: bytes.len() as u64,
            stream: byte_stream(bytes),
            content_type,
            etag,
        })
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let result = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(result) => result,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                return Err(if missing {
                    BlobError::not_found(key)
                } else {
                    Self::map_aws_error(err)
                });
            }
        };

        Ok(ObjectHead {
            size_bytes: result.content_length().unwrap_or(0).max(0) as u64,
            content_type: result.content_type().map(str::to_string),
            etag: result.e_tag().map(str::to_string),
            last_modified: result.last_modified().map(|dt| dt.secs()),
        })
    }

    // S3 DeleteObject succeeds for absent keys, so every success reports Deleted.
    async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;
        Ok(DeleteOutcome::Deleted)
    }

    fn public_url(&self, key: &str) -> Option<String> {
        Some(format!(
            "{}/{}/{}",
            self.endpoint_url.trim_end_matches('/'),
            self.bucket,
            key
        ))
    }
}
