//! Asset lifecycle: Upload, Update, Delete, Get and List across the blob store,
//! the record store and the event publisher.
//!
//! There is no cross-store transaction. Ordering is the guarantee:
//! - upload: both blobs stored, then the record
//! - update: new blobs stored, record committed, superseded blobs deleted
//! - delete: document blob, cover blob, then the record
//!
//! A failure after a durable step is reported as [`AssetError::PartialFailure`]
//! naming what was left behind; nothing is compensated automatically.

use std::sync::Arc;

use chrono::Utc;
use regex::RegexBuilder;
use serde_json::json;
use shelf_blob::{BlobAdapter, BlobError, BlobPut, FetchedBlob, StoredBlob};
use shelf_core::EventPublisher;
use tracing::{info, warn};
use uuid::Uuid;

use super::assets_locks::AssetLocks;
use super::assets_shared::{
    Asset, AssetChanges, AssetError, AssetFile, AssetOperation, AssetPart, AssetSettings,
    DeletedAsset, FilePayload, NewAsset, PartialFailureReport, EVENT_CREATED, EVENT_DELETED,
    EVENT_UPDATED,
};
use super::assets_store::{AssetFilter, AssetRecordStore, RecordError};

pub struct AssetCoordinator {
    blobs: Arc<BlobAdapter>,
    records: Arc<dyn AssetRecordStore>,
    events: Arc<dyn EventPublisher>,
    locks: AssetLocks,
    settings: AssetSettings,
}

fn partial(
    operation: AssetOperation,
    failed_step: &str,
    committed: &[&str],
    orphaned: Vec<String>,
    dangling_record: Option<String>,
    reason: impl ToString,
) -> AssetError {
    AssetError::PartialFailure(Box::new(PartialFailureReport {
        operation,
        failed_step: failed_step.to_string(),
        committed: committed.iter().map(|s| s.to_string()).collect(),
        orphaned,
        dangling_record,
        reason: reason.to_string(),
    }))
}

/// Blank text counts as absent; anything else is kept exactly as submitted.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AssetCoordinator {
    pub fn new(
        blobs: Arc<BlobAdapter>,
        records: Arc<dyn AssetRecordStore>,
        events: Arc<dyn EventPublisher>,
        settings: AssetSettings,
    ) -> Self {
        Self {
            blobs,
            records,
            events,
            locks: AssetLocks::new(settings.serialize_per_id),
            settings,
        }
    }

    pub fn settings(&self) -> &AssetSettings {
        &self.settings
    }

    fn check_document_format(&self, document: &FilePayload) -> Result<(), AssetError> {
        if document.media_type() != self.settings.document_content_type {
            return Err(AssetError::InvalidFormat(format!(
                "Only {} documents are allowed, got '{}'",
                self.settings.document_content_type, document.content_type
            )));
        }
        Ok(())
    }

    /// Oversized payloads are rejected before any blob write starts.
    fn check_size(&self, file: &FilePayload) -> Result<(), AssetError> {
        let max = self.blobs.config().max_blob_bytes;
        let size = file.bytes.len() as u64;
        if size > max {
            return Err(AssetError::InvalidInput(format!(
                "File '{}' is {size} bytes, the maximum is {max}",
                file.filename
            )));
        }
        Ok(())
    }

    async fn store_file(&self, namespace: &str, file: &FilePayload) -> Result<StoredBlob, BlobError> {
        let put = BlobPut::new(namespace, file.filename.as_str())
            .with_content_type(file.content_type.as_str());
        self.blobs.store(put, file.bytes.clone()).await
    }

    fn asset_file(file: &FilePayload, stored: StoredBlob) -> AssetFile {
        AssetFile {
            original_name: file.filename.clone(),
            blob_locator: stored.locator,
            retrieval_url: stored.retrieval_url,
        }
    }

    fn publish(&self, topic: &str, payload: serde_json::Value) {
        self.events.publish(topic, payload);
    }

    pub async fn upload(&self, input: NewAsset) -> Result<Asset, AssetError> {
        let op = AssetOperation::Upload;

        let document = input
            .document
            .ok_or_else(|| AssetError::InvalidInput("A document file is required".into()))?;
        self.check_document_format(&document)?;
        let cover = input
            .cover
            .ok_or_else(|| AssetError::InvalidInput("A cover image is required".into()))?;
        let title = non_blank(input.title)
            .ok_or_else(|| AssetError::InvalidInput("Title is required".into()))?;
        let author = non_blank(input.author)
            .ok_or_else(|| AssetError::InvalidInput("Author is required".into()))?;
        let description = non_blank(input.description);
        self.check_size(&document)?;
        self.check_size(&cover)?;

        let (stored_document, stored_cover) = tokio::join!(
            self.store_file(&self.settings.document_namespace, &document),
            self.store_file(&self.settings.cover_namespace, &cover),
        );

        let (stored_document, stored_cover) = match (stored_document, stored_cover) {
            (Ok(d), Ok(c)) => (d, c),
            (Ok(d), Err(err)) => {
                return Err(partial(op, "store_cover", &["store_document"], vec![d.locator], None, err));
            }
            (Err(err), Ok(c)) => {
                return Err(partial(op, "store_document", &["store_cover"], vec![c.locator], None, err));
            }
            (Err(err), Err(_)) => {
                return Err(AssetError::StoreError {
                    operation: op,
                    source: err,
                });
            }
        };

        let now = Utc::now();
        let asset = Asset {
            id: Uuid::new_v4().to_string(),
            document: Self::asset_file(&document, stored_document),
            cover: Self::asset_file(&cover, stored_cover),
            title,
            author,
            description,
            created_at: now,
            updated_at: now,
        };

        let asset = match self.records.create(asset.clone()).await {
            Ok(created) => created,
            Err(err) => {
                let orphaned = vec![
                    asset.document.blob_locator.clone(),
                    asset.cover.blob_locator.clone(),
                ];
                return Err(partial(
                    op,
                    "persist_record",
                    &["store_document", "store_cover"],
                    orphaned,
                    None,
                    err,
                ));
            }
        };

        info!(id = %asset.id, document = %asset.document.blob_locator, "asset uploaded");
        self.publish(EVENT_CREATED, json!(asset));
        Ok(asset)
    }

    pub async fn update(&self, id: &str, changes: AssetChanges) -> Result<Asset, AssetError> {
        let op = AssetOperation::Update;
        let _lock = self.locks.acquire(id).await;

        let existing = self
            .records
            .get_by_id(id)
            .await
            .map_err(|e| AssetError::from_record(op, e))?;

        if let Some(document) = &changes.document {
            self.check_document_format(document)?;
        }
        for file in changes.document.iter().chain(changes.cover.iter()) {
            self.check_size(file)?;
        }

        let (new_document, new_cover) = tokio::join!(
            async {
                match &changes.document {
                    Some(file) => Some(self.store_file(&self.settings.document_namespace, file).await),
                    None => None,
                }
            },
            async {
                match &changes.cover {
                    Some(file) => Some(self.store_file(&self.settings.cover_namespace, file).await),
                    None => None,
                }
            },
        );

        let mut stored: Vec<String> = Vec::new();
        let mut committed: Vec<&str> = Vec::new();
        let mut failure: Option<(&str, BlobError)> = None;
        let new_document = match new_document {
            Some(Ok(blob)) => {
                stored.push(blob.locator.clone());
                committed.push("store_document");
                Some(blob)
            }
            Some(Err(err)) => {
                failure = Some(("store_document", err));
                None
            }
            None => None,
        };
        let new_cover = match new_cover {
            Some(Ok(blob)) => {
                stored.push(blob.locator.clone());
                committed.push("store_cover");
                Some(blob)
            }
            Some(Err(err)) => {
                failure.get_or_insert(("store_cover", err));
                None
            }
            None => None,
        };
        if let Some((step, err)) = failure {
            if stored.is_empty() {
                return Err(AssetError::StoreError {
                    operation: op,
                    source: err,
                });
            }
            return Err(partial(op, step, &committed, stored, None, err));
        }

        let mut updated = existing.clone();
        let mut superseded: Vec<(&str, String)> = Vec::new();
        if let (Some(file), Some(blob)) = (&changes.document, new_document) {
            superseded.push(("delete_superseded_document", existing.document.blob_locator.clone()));
            updated.document = Self::asset_file(file, blob);
        }
        if let (Some(file), Some(blob)) = (&changes.cover, new_cover) {
            superseded.push(("delete_superseded_cover", existing.cover.blob_locator.clone()));
            updated.cover = Self::asset_file(file, blob);
        }
        if let Some(title) = non_blank(changes.title) {
            updated.title = title;
        }
        if let Some(author) = non_blank(changes.author) {
            updated.author = author;
        }
        if let Some(description) = non_blank(changes.description) {
            updated.description = Some(description);
        }
        updated.updated_at = Utc::now();

        let updated = match self.records.update(id, updated).await {
            Ok(updated) => updated,
            Err(err) if stored.is_empty() => return Err(AssetError::from_record(op, err)),
            Err(err) => {
                return Err(partial(op, "persist_record", &committed, stored, None, err));
            }
        };
        committed.push("persist_record");

        // The record no longer references the old blobs from here on.
        self.publish(EVENT_UPDATED, json!(updated));
        info!(id = %updated.id, replaced = superseded.len(), "asset updated");

        let mut leftover: Vec<String> = Vec::new();
        let mut first_failure: Option<(&str, BlobError)> = None;
        for (step, locator) in superseded {
            match self.blobs.delete(&locator).await {
                Ok(_) => {}
                Err(err) => {
                    warn!(id = %updated.id, locator = %locator, error = %err, "superseded blob not deleted");
                    leftover.push(locator);
                    first_failure.get_or_insert((step, err));
                }
            }
        }
        if let Some((step, err)) = first_failure {
            return Err(partial(op, step, &committed, leftover, None, err));
        }

        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<DeletedAsset, AssetError> {
        let op = AssetOperation::Delete;
        let _lock = self.locks.acquire(id).await;

        let existing = self
            .records
            .get_by_id(id)
            .await
            .map_err(|e| AssetError::from_record(op, e))?;

        self.blobs
            .delete(&existing.document.blob_locator)
            .await
            .map_err(|err| AssetError::StoreError {
                operation: op,
                source: err,
            })?;

        if let Err(err) = self.blobs.delete(&existing.cover.blob_locator).await {
            return Err(partial(
                op,
                "delete_cover",
                &["delete_document"],
                Vec::new(),
                Some(existing.id.clone()),
                err,
            ));
        }

        match self.records.delete_by_id(id).await {
            // Gone already: both blobs are gone too, so the asset is fully deleted.
            Ok(()) | Err(RecordError::NotFound(_)) => {}
            Err(err) => {
                return Err(partial(
                    op,
                    "delete_record",
                    &["delete_document", "delete_cover"],
                    Vec::new(),
                    Some(existing.id.clone()),
                    err,
                ));
            }
        }

        info!(id = %id, "asset deleted");
        self.publish(EVENT_DELETED, json!({ "id": id }));
        Ok(DeletedAsset {
            message: "Asset and its files deleted successfully".to_string(),
            id: id.to_string(),
        })
    }

    pub async fn get(&self, id: &str) -> Result<Asset, AssetError> {
        self.records
            .get_by_id(id)
            .await
            .map_err(|e| AssetError::from_record(AssetOperation::Get, e))
    }

    /// List assets whose document name matches `pattern` (case-insensitive),
    /// or the configured default pattern.
    pub async fn list(&self, pattern: Option<&str>) -> Result<Vec<Asset>, AssetError> {
        let pattern = pattern
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.settings.list_pattern.as_str());

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AssetError::InvalidInput(format!("Invalid document name pattern: {e}")))?;

        let filter = AssetFilter {
            document_name: Some(regex),
        };
        self.records
            .list(&filter)
            .await
            .map_err(|e| AssetError::from_record(AssetOperation::List, e))
    }

    /// Fetch the bytes of one of an asset's files
    pub async fn read_file(&self, id: &str, part: AssetPart) -> Result<FetchedBlob, AssetError> {
        let asset = self.get(id).await?;
        let file = part.select(&asset);
        self.blobs.read(&file.blob_locator).await.map_err(|err| match err {
            BlobError::NotFound { .. } => AssetError::NotFound(id.to_string()),
            other => AssetError::StoreError {
                operation: AssetOperation::Get,
                source: other,
            },
        })
    }
}
