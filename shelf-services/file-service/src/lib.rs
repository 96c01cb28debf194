pub mod app;
pub mod channels;
pub mod config;
pub mod services;

use std::sync::Arc;

use anyhow::bail;
use shelf_axum::AxumApp;
use shelf_blob::{BlobAdapter, BlobConfig, BlobStore, MemoryBlobStore, S3CompatibleStore};
use shelf_core::{EventHub, ShelfConfig, ShelfConfigSnapshot};
use shelf_queue::{MemoryBackend, QueueAdapter};

use services::assets::{AssetCoordinator, AssetRecordStore, AssetSettings, MemoryAssetStore};

pub struct FileServiceApp {
    pub config: ShelfConfigSnapshot,
    pub app: AxumApp,
    pub hub: Arc<EventHub>,
    pub coordinator: Arc<AssetCoordinator>,
    pub queue: QueueAdapter,
}

impl FileServiceApp {
    pub fn addr(&self) -> String {
        let host = self
            .config
            .get_string("http.host")
            .unwrap_or_else(|| "127.0.0.1".to_string());
        let port = self.config.get_u16("http.port").unwrap_or(5003);
        format!("{host}:{port}")
    }

    pub async fn listen(self) -> anyhow::Result<()> {
        let addr = self.addr();
        self.app.listen(addr).await
    }
}

fn blob_config(config: &ShelfConfigSnapshot) -> BlobConfig {
    let mut blob = BlobConfig::new();
    if let Some(max) = config.get_usize("blob.max_bytes") {
        blob = blob.with_max_blob_bytes(max as u64);
    }
    if let Some(base) = config.get_string("blob.public_base_url") {
        blob = blob.with_public_base_url(base);
    }
    blob
}

async fn blob_store(config: &ShelfConfigSnapshot) -> anyhow::Result<Arc<dyn BlobStore>> {
    let backend = config
        .get_string("blob.backend")
        .unwrap_or_else(|| "memory".to_string());
    match backend.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryBlobStore::new())),
        "s3" => Ok(Arc::new(S3CompatibleStore::from_env().await?)),
        other => bail!("Unknown BLOB_BACKEND '{other}', expected 'memory' or 's3'"),
    }
}

/// Build the service from the environment
pub async fn build() -> anyhow::Result<FileServiceApp> {
    let mut config = ShelfConfig::new();
    config::config(&mut config);
    let snapshot = config.snapshot();

    let blobs = blob_store(&snapshot).await?;
    let records: Arc<dyn AssetRecordStore> = Arc::new(MemoryAssetStore::new());
    let queue = QueueAdapter::new(MemoryBackend::new());

    Ok(assemble(snapshot, blobs, records, queue))
}

/// Wire explicit store and queue handles into a runnable app
pub fn assemble(
    config: ShelfConfigSnapshot,
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn AssetRecordStore>,
    queue: QueueAdapter,
) -> FileServiceApp {
    let hub = Arc::new(EventHub::new());
    let events_queue = config
        .get_string("assets.events_queue")
        .unwrap_or_else(|| "file_events".to_string());
    channels::configure(&hub, queue.clone(), &events_queue);

    let settings = AssetSettings::from_config(&config);
    tracing::info!(
        document_namespace = %settings.document_namespace,
        cover_namespace = %settings.cover_namespace,
        serialize_per_id = settings.serialize_per_id,
        "asset settings loaded"
    );

    let adapter = Arc::new(BlobAdapter::from_arc(blobs, blob_config(&config)));
    let coordinator = Arc::new(AssetCoordinator::new(
        adapter,
        records,
        hub.clone(),
        settings,
    ));

    let app = app::file_app(&config, Arc::clone(&coordinator), queue.clone());

    FileServiceApp {
        config,
        app,
        hub,
        coordinator,
        queue,
    }
}
