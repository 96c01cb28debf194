use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf_blob::BlobError;
use shelf_core::{ShelfConfigSnapshot, ShelfError};
use thiserror::Error;

use super::assets_store::RecordError;

pub const EVENT_CREATED: &str = "asset.created";
pub const EVENT_UPDATED: &str = "asset.updated";
pub const EVENT_DELETED: &str = "asset.deleted";

/// One stored file as referenced by an asset record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
    pub original_name: String,
    pub blob_locator: String,
    pub retrieval_url: String,
}

/// A document plus its cover image and descriptive text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub document: AssetFile,
    pub cover: AssetFile,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw file received from a client
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FilePayload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Media type without parameters, lowercased
    pub fn media_type(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    pub document: Option<FilePayload>,
    pub cover: Option<FilePayload>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

/// Every part is optional; blank text keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetChanges {
    #[serde(skip)]
    pub document: Option<FilePayload>,
    #[serde(skip)]
    pub cover: Option<FilePayload>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

/// Which of the two files of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPart {
    Document,
    Cover,
}

impl AssetPart {
    pub fn select<'a>(&self, asset: &'a Asset) -> &'a AssetFile {
        match self {
            AssetPart::Document => &asset.document,
            AssetPart::Cover => &asset.cover,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedAsset {
    pub message: String,
    pub id: String,
}

/// Settings read once at startup
#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub document_namespace: String,
    pub cover_namespace: String,
    pub document_content_type: String,
    pub list_pattern: String,
    pub serialize_per_id: bool,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            document_namespace: "epub_files".to_string(),
            cover_namespace: "cover_images".to_string(),
            document_content_type: "application/epub+zip".to_string(),
            list_pattern: r"\.epub$".to_string(),
            serialize_per_id: true,
        }
    }
}

impl AssetSettings {
    pub fn from_config(config: &ShelfConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            document_namespace: config
                .get_string("assets.document_namespace")
                .unwrap_or(defaults.document_namespace),
            cover_namespace: config
                .get_string("assets.cover_namespace")
                .unwrap_or(defaults.cover_namespace),
            document_content_type: config
                .get_string("assets.document_content_type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or(defaults.document_content_type),
            list_pattern: config
                .get_string("assets.list_pattern")
                .unwrap_or(defaults.list_pattern),
            serialize_per_id: config
                .get_bool("assets.serialize_per_id")
                .unwrap_or(defaults.serialize_per_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetOperation {
    Upload,
    Update,
    Delete,
    Get,
    List,
}

impl fmt::Display for AssetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetOperation::Upload => write!(f, "upload"),
            AssetOperation::Update => write!(f, "update"),
            AssetOperation::Delete => write!(f, "delete"),
            AssetOperation::Get => write!(f, "get"),
            AssetOperation::List => write!(f, "list"),
        }
    }
}

/// What a half-finished operation left behind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialFailureReport {
    pub operation: AssetOperation,
    pub failed_step: String,
    /// Steps that completed durably before the failure
    pub committed: Vec<String>,
    /// Blob locators no record refers to any more
    pub orphaned: Vec<String>,
    /// Record whose blobs are (partly) gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dangling_record: Option<String>,
    pub reason: String,
}

impl fmt::Display for PartialFailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} partially failed at {}: {}",
            self.operation, self.failed_step, self.reason
        )
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Blob store failed during {operation}: {source}")]
    StoreError {
        operation: AssetOperation,
        #[source]
        source: BlobError,
    },

    #[error("Record store failed during {operation}: {reason}")]
    PersistError {
        operation: AssetOperation,
        reason: String,
    },

    #[error("{0}")]
    PartialFailure(Box<PartialFailureReport>),
}

impl AssetError {
    pub(crate) fn from_record(operation: AssetOperation, err: RecordError) -> Self {
        match err {
            RecordError::NotFound(id) => AssetError::NotFound(id),
            RecordError::Persist(reason) => AssetError::PersistError { operation, reason },
        }
    }

    pub fn partial_report(&self) -> Option<&PartialFailureReport> {
        match self {
            AssetError::PartialFailure(report) => Some(report),
            _ => None,
        }
    }
}

impl From<AssetError> for ShelfError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InvalidFormat(msg) | AssetError::InvalidInput(msg) => {
                ShelfError::bad_request(msg)
            }
            AssetError::NotFound(id) => ShelfError::not_found(format!("Asset not found: {id}")),
            AssetError::StoreError { operation, source } => {
                ShelfError::general_error(format!("Failed to {operation} asset files"))
                    .with_source(anyhow::Error::new(source))
            }
            AssetError::PersistError { operation, reason } => {
                ShelfError::general_error(format!("Failed to {operation} asset record"))
                    .with_source(anyhow::anyhow!(reason))
            }
            AssetError::PartialFailure(report) => {
                let data = serde_json::to_value(report.as_ref()).unwrap_or_default();
                ShelfError::partial_failure(report.to_string()).with_data(data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{ErrorKind, ShelfConfig};

    #[test]
    fn asset_json_is_camel_case() {
        let now = Utc::now();
        let file = AssetFile {
            original_name: "a.epub".into(),
            blob_locator: "epub_files/1-a.epub".into(),
            retrieval_url: "memory://epub_files/1-a.epub".into(),
        };
        let asset = Asset {
            id: "1".into(),
            document: file.clone(),
            cover: file,
            title: "T".into(),
            author: "A".into(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["document"]["originalName"], "a.epub");
        assert_eq!(json["document"]["blobLocator"], "epub_files/1-a.epub");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn media_type_ignores_parameters_and_case() {
        let file = FilePayload::new("a.epub", "Application/EPUB+zip; charset=binary", Bytes::new());
        assert_eq!(file.media_type(), "application/epub+zip");
    }

    #[test]
    fn partial_failure_maps_to_its_own_kind_with_detail() {
        let err = AssetError::PartialFailure(Box::new(PartialFailureReport {
            operation: AssetOperation::Delete,
            failed_step: "delete_cover".into(),
            committed: vec!["delete_document".into()],
            orphaned: vec![],
            dangling_record: Some("a1".into()),
            reason: "timeout".into(),
        }));
        let shelf: ShelfError = err.into();
        assert_eq!(shelf.kind, ErrorKind::PartialFailure);
        let json = shelf.to_json();
        assert_eq!(json["data"]["failedStep"], "delete_cover");
        assert_eq!(json["data"]["danglingRecord"], "a1");
        assert_eq!(json["data"]["operation"], "delete");
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let mut config = ShelfConfig::new();
        config.set("assets.cover_namespace", "covers");
        config.set("assets.serialize_per_id", "false");
        let settings = AssetSettings::from_config(&config.snapshot());
        assert_eq!(settings.cover_namespace, "covers");
        assert_eq!(settings.document_namespace, "epub_files");
        assert!(!settings.serialize_per_id);
    }
}
