use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    byte_stream, BlobError, BlobResult, BlobStore, ByteStream, DeleteOutcome, GetResult,
    ObjectHead, PutResult,
};

#[derive(Debug, Clone)]
struct MemoryObject {
    bytes: Bytes,
    content_type: Option<String>,
    etag: String,
    stored_at: i64,
}

/// In-process store for tests and local development. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, MemoryObject>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult> {
        let bytes = stream
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await?
            .freeze();

        let etag = format!("\"{}\"", Uuid::new_v4().simple());
        let size_bytes = bytes.len() as u64;
        let stored_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        self.objects.write().insert(
            key.to_string(),
            MemoryObject {
                bytes,
                content_type: content_type.map(str::to_string),
                etag: etag.clone(),
                stored_at,
            },
        );

        Ok(PutResult {
            etag: Some(etag),
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        let object = self
            .objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::not_found(key))?;

        Ok(GetResult {
            size_bytes: object.bytes.len() as u64,
            stream: byte_stream(object.bytes),
            content_type: object.content_type,
            etag: Some(object.etag),
        })
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let objects = self.objects.read();
        let object = objects.get(key).ok_or_else(|| BlobError::not_found(key))?;
        Ok(ObjectHead {
            size_bytes: object.bytes.len() as u64,
            content_type: object.content_type.clone(),
            etag: Some(object.etag.clone()),
            last_modified: Some(object.stored_at),
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome> {
        match self.objects.write().remove(key) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    fn public_url(&self, key: &str) -> Option<String> {
        Some(format!("memory://{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn head_and_get_miss_with_not_found() {
        let store = MemoryBlobStore::new();
        assert!(store.head("nope").await.unwrap_err().is_not_found());
        assert!(matches!(store.get("nope").await, Err(BlobError::NotFound { .. })));
    }

    #[tokio::test]
    async fn clones_share_objects() {
        let store = MemoryBlobStore::new();
        let other = store.clone();
        store
            .put("ns/k", Some("image/png"), byte_stream(Bytes::from_static(b"img")))
            .await
            .unwrap();
        assert!(other.contains("ns/k"));
        assert_eq!(other.keys(), vec!["ns/k".to_string()]);
        assert_eq!(other.head("ns/k").await.unwrap().size_bytes, 3);
    }
}
