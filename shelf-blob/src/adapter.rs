use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;

use crate::{
    byte_stream, BlobConfig, BlobError, BlobId, BlobKeyStrategy, BlobPut, BlobResult, BlobStore,
    DefaultKeyStrategy, DeleteOutcome, FetchedBlob, StoredBlob,
};

/// The main blob adapter - this is what services embed
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    keys: Arc<dyn BlobKeyStrategy>,
    config: BlobConfig,
}

impl BlobAdapter {
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    /// Build over a store that is also held elsewhere
    pub fn from_arc(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self {
            store,
            keys: Arc::new(DefaultKeyStrategy),
            config,
        }
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    /// Store a buffered blob under a fresh, never-reused key in `put.namespace`.
    pub async fn store(&self, put: BlobPut, body: Bytes) -> BlobResult<StoredBlob> {
        let size = body.len() as u64;
        if size > self.config.max_blob_bytes {
            return Err(BlobError::TooLarge {
                size,
                max: self.config.max_blob_bytes,
            });
        }
        if put.namespace.trim_matches('/').is_empty() {
            return Err(BlobError::invalid("Blob namespace must not be empty"));
        }

        let blob_id = BlobId::new();
        let key = self
            .keys
            .object_key(&put.namespace, blob_id.as_str(), &put.filename);

        let result = self
            .store
            .put(&key, put.content_type.as_deref(), byte_stream(body))
            .await?;

        tracing::debug!(locator = %key, size_bytes = result.size_bytes, "stored blob");

        Ok(StoredBlob {
            retrieval_url: self.retrieval_url(&key),
            locator: key,
            size_bytes: result.size_bytes,
            content_type: put.content_type,
            etag: result.etag,
        })
    }

    /// Read a blob fully into memory
    pub async fn read(&self, locator: &str) -> BlobResult<FetchedBlob> {
        let result = self.store.get(locator).await?;
        let bytes = result
            .stream
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await?
            .freeze();

        Ok(FetchedBlob {
            locator: locator.to_string(),
            bytes,
            content_type: result.content_type,
        })
    }

    pub async fn exists(&self, locator: &str) -> BlobResult<bool> {
        match self.store.head(locator).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Delete a blob; an already-absent blob is a success.
    pub async fn delete(&self, locator: &str) -> BlobResult<DeleteOutcome> {
        let outcome = match self.store.delete(locator).await {
            Ok(outcome) => outcome,
            Err(err) if err.is_not_found() => DeleteOutcome::NotFound,
            Err(err) => return Err(err),
        };
        tracing::debug!(locator = %locator, outcome = ?outcome, "deleted blob");
        Ok(outcome)
    }

    pub fn retrieval_url(&self, locator: &str) -> String {
        if let Some(base) = &self.config.public_base_url {
            return format!("{}/{}", base.trim_end_matches('/'), locator);
        }
        self.store
            .public_url(locator)
            .unwrap_or_else(|| format!("/{locator}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBlobStore;

    fn adapter(store: MemoryBlobStore) -> BlobAdapter {
        BlobAdapter::new(store, BlobConfig::default())
    }

    #[tokio::test]
    async fn store_then_read_is_byte_exact() {
        let blobs = adapter(MemoryBlobStore::new());
        let put = BlobPut::new("epub_files", "a.epub").with_content_type("application/epub+zip");
        let stored = blobs.store(put, Bytes::from_static(b"PK\x03\x04book")).await.unwrap();

        assert!(stored.locator.starts_with("epub_files/"));
        assert!(stored.locator.ends_with("-a.epub"));
        assert_eq!(stored.size_bytes, 8);

        let fetched = blobs.read(&stored.locator).await.unwrap();
        assert_eq!(&fetched.bytes[..], b"PK\x03\x04book");
        assert_eq!(fetched.content_type.as_deref(), Some("application/epub+zip"));
    }

    #[tokio::test]
    async fn same_name_twice_gets_distinct_locators() {
        let blobs = adapter(MemoryBlobStore::new());
        let a = blobs.store(BlobPut::new("cover_images", "c.png"), Bytes::from_static(b"1")).await.unwrap();
        let b = blobs.store(BlobPut::new("cover_images", "c.png"), Bytes::from_static(b"2")).await.unwrap();
        assert_ne!(a.locator, b.locator);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let blobs = adapter(MemoryBlobStore::new());
        let stored = blobs.store(BlobPut::new("epub_files", "x.epub"), Bytes::from_static(b"x")).await.unwrap();

        assert_eq!(blobs.delete(&stored.locator).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(blobs.delete(&stored.locator).await.unwrap(), DeleteOutcome::NotFound);
        assert!(!blobs.exists(&stored.locator).await.unwrap());
    }

    #[tokio::test]
    async fn oversized_blob_is_rejected_before_the_store() {
        let store = MemoryBlobStore::new();
        let blobs = BlobAdapter::new(store.clone(), BlobConfig::new().with_max_blob_bytes(4));
        let err = blobs
            .store(BlobPut::new("epub_files", "big.epub"), Bytes::from_static(b"12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::TooLarge { size: 5, max: 4 }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn retrieval_url_prefers_configured_base() {
        let blobs = BlobAdapter::new(
            MemoryBlobStore::new(),
            BlobConfig::new().with_public_base_url("https://cdn.example.com/"),
        );
        let stored = blobs.store(BlobPut::new("cover_images", "c.png"), Bytes::from_static(b"c")).await.unwrap();
        assert_eq!(
            stored.retrieval_url,
            format!("https://cdn.example.com/{}", stored.locator)
        );
    }
}
