#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use file_service::services::assets::{
    Asset, AssetFilter, AssetRecordStore, FilePayload, MemoryAssetStore, NewAsset, RecordError,
    RecordResult,
};
use file_service::{assemble, FileServiceApp};
use parking_lot::Mutex;
use shelf_blob::{
    BlobError, BlobResult, BlobStore, ByteStream, DeleteOutcome, GetResult, MemoryBlobStore,
    ObjectHead, PutResult,
};
use shelf_core::{LifecycleEvent, ShelfConfig};
use shelf_queue::{MemoryBackend, QueueAdapter};
use tokio::sync::mpsc;

pub const EPUB: &str = "application/epub+zip";

fn injected(op: &str, key: &str) -> BlobError {
    BlobError::backend(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("injected {op} failure for {key}"),
    ))
}

fn namespace(key: &str) -> &str {
    key.split('/').next().unwrap_or_default()
}

/// Memory blob store that counts calls and fails on demand per namespace
#[derive(Default)]
pub struct FlakyBlobStore {
    pub inner: MemoryBlobStore,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_put: Mutex<HashSet<String>>,
    fail_delete: Mutex<HashSet<String>>,
}

impl FlakyBlobStore {
    pub fn fail_put_in(&self, ns: &str) {
        self.fail_put.lock().insert(ns.to_string());
    }

    pub fn fail_delete_in(&self, ns: &str) {
        self.fail_delete.lock().insert(ns.to_string());
    }

    pub fn heal(&self) {
        self.fail_put.lock().clear();
        self.fail_delete.lock().clear();
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.puts() + self.deletes()
    }

    pub fn keys_in(&self, ns: &str) -> Vec<String> {
        self.inner
            .keys()
            .into_iter()
            .filter(|k| namespace(k) == ns)
            .collect()
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.lock().contains(namespace(key)) {
            return Err(injected("put", key));
        }
        self.inner.put(key, content_type, stream).await
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        self.inner.get(key).await
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        self.inner.head(key).await
    }

    async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.lock().contains(namespace(key)) {
            return Err(injected("delete", key));
        }
        self.inner.delete(key).await
    }
}

/// Memory record store with switchable failures
#[derive(Default)]
pub struct FlakyRecordStore {
    pub inner: MemoryAssetStore,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Delete removes the record but reports it as already gone
    pub vanish_on_delete: AtomicBool,
}

impl FlakyRecordStore {
    pub fn set(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }
}

fn down() -> RecordError {
    RecordError::Persist("record store unreachable".to_string())
}

#[async_trait]
impl AssetRecordStore for FlakyRecordStore {
    async fn create(&self, asset: Asset) -> RecordResult<Asset> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(down());
        }
        self.inner.create(asset).await
    }

    async fn get_by_id(&self, id: &str) -> RecordResult<Asset> {
        self.inner.get_by_id(id).await
    }

    async fn update(&self, id: &str, asset: Asset) -> RecordResult<Asset> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(down());
        }
        self.inner.update(id, asset).await
    }

    async fn delete_by_id(&self, id: &str) -> RecordResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(down());
        }
        if self.vanish_on_delete.load(Ordering::SeqCst) {
            self.inner.delete_by_id(id).await?;
            return Err(RecordError::NotFound(id.to_string()));
        }
        self.inner.delete_by_id(id).await
    }

    async fn list(&self, filter: &AssetFilter) -> RecordResult<Vec<Asset>> {
        self.inner.list(filter).await
    }
}

pub struct Harness {
    pub blobs: Arc<FlakyBlobStore>,
    pub records: Arc<FlakyRecordStore>,
    pub service: FileServiceApp,
    pub events: mpsc::UnboundedReceiver<Arc<LifecycleEvent>>,
}

pub fn harness() -> Harness {
    harness_with(ShelfConfig::new())
}

pub fn harness_with(config: ShelfConfig) -> Harness {
    let blobs = Arc::new(FlakyBlobStore::default());
    let records = Arc::new(FlakyRecordStore::default());
    let service = assemble(
        config.snapshot(),
        blobs.clone(),
        records.clone(),
        QueueAdapter::new(MemoryBackend::new()),
    );

    let (tx, events) = mpsc::unbounded_channel();
    service.hub.on("*", move |event| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(event);
            Ok(())
        }
    });

    Harness {
        blobs,
        records,
        service,
        events,
    }
}

impl Harness {
    pub async fn next_event(&mut self) -> Arc<LifecycleEvent> {
        tokio::time::timeout(Duration::from_secs(1), self.events.recv())
            .await
            .expect("event within a second")
            .expect("event channel open")
    }

    pub async fn assert_no_event(&mut self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(self.events.try_recv().is_err(), "unexpected event");
    }
}

pub fn epub(name: &str, body: &'static [u8]) -> FilePayload {
    FilePayload::new(name, EPUB, Bytes::from_static(body))
}

pub fn png(name: &str, body: &'static [u8]) -> FilePayload {
    FilePayload::new(name, "image/png", Bytes::from_static(body))
}

pub fn new_asset(document: &str, cover: &str, title: &str, author: &str) -> NewAsset {
    NewAsset {
        document: Some(epub(document, b"EPUB-BYTES")),
        cover: Some(png(cover, b"PNG-BYTES")),
        title: Some(title.to_string()),
        author: Some(author.to_string()),
        description: None,
    }
}
