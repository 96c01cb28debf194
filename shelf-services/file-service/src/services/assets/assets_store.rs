use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use thiserror::Error;

use super::assets_shared::Asset;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Asset record not found: {0}")]
    NotFound(String),

    #[error("Asset record store failure: {0}")]
    Persist(String),
}

pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// Matched against `document.original_name`
    pub document_name: Option<Regex>,
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        self.document_name
            .as_ref()
            .map(|re| re.is_match(&asset.document.original_name))
            .unwrap_or(true)
    }
}

/// Metadata record store. Each call is atomic for a single record.
#[async_trait]
pub trait AssetRecordStore: Send + Sync {
    async fn create(&self, asset: Asset) -> RecordResult<Asset>;

    async fn get_by_id(&self, id: &str) -> RecordResult<Asset>;

    async fn update(&self, id: &str, asset: Asset) -> RecordResult<Asset>;

    async fn delete_by_id(&self, id: &str) -> RecordResult<()>;

    /// Matching records, oldest first
    async fn list(&self, filter: &AssetFilter) -> RecordResult<Vec<Asset>>;
}

#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    records: RwLock<HashMap<String, Asset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl AssetRecordStore for MemoryAssetStore {
    async fn create(&self, asset: Asset) -> RecordResult<Asset> {
        let mut records = self.records.write();
        if records.contains_key(&asset.id) {
            return Err(RecordError::Persist(format!(
                "Asset record {} already exists",
                asset.id
            )));
        }
        records.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    async fn get_by_id(&self, id: &str) -> RecordResult<Asset> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RecordError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, asset: Asset) -> RecordResult<Asset> {
        let mut records = self.records.write();
        let slot = records
            .get_mut(id)
            .ok_or_else(|| RecordError::NotFound(id.to_string()))?;
        *slot = asset.clone();
        Ok(asset)
    }

    async fn delete_by_id(&self, id: &str) -> RecordResult<()> {
        self.records
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RecordError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: &AssetFilter) -> RecordResult<Vec<Asset>> {
        let mut assets: Vec<Asset> = self
            .records
            .read()
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assets::assets_shared::AssetFile;
    use chrono::{Duration, Utc};
    use regex::RegexBuilder;

    fn asset(id: &str, document_name: &str, age_secs: i64) -> Asset {
        let at = Utc::now() - Duration::seconds(age_secs);
        let file = |name: &str| AssetFile {
            original_name: name.to_string(),
            blob_locator: format!("ns/{id}-{name}"),
            retrieval_url: format!("memory://ns/{id}-{name}"),
        };
        Asset {
            id: id.to_string(),
            document: file(document_name),
            cover: file("cover.png"),
            title: "T".into(),
            author: "A".into(),
            description: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn create_get_update_delete() {
        let store = MemoryAssetStore::new();
        store.create(asset("a", "a.epub", 0)).await.unwrap();
        assert!(matches!(
            store.create(asset("a", "a.epub", 0)).await,
            Err(RecordError::Persist(_))
        ));

        let mut changed = store.get_by_id("a").await.unwrap();
        changed.title = "New".into();
        store.update("a", changed).await.unwrap();
        assert_eq!(store.get_by_id("a").await.unwrap().title, "New");

        store.delete_by_id("a").await.unwrap();
        assert_eq!(
            store.delete_by_id("a").await,
            Err(RecordError::NotFound("a".into()))
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = MemoryAssetStore::new();
        let err = store.update("ghost", asset("ghost", "g.epub", 0)).await.unwrap_err();
        assert_eq!(err, RecordError::NotFound("ghost".into()));
    }

    #[tokio::test]
    async fn list_filters_and_orders_oldest_first() {
        let store = MemoryAssetStore::new();
        store.create(asset("new", "b.EPUB", 1)).await.unwrap();
        store.create(asset("old", "a.epub", 10)).await.unwrap();
        store.create(asset("pdf", "c.pdf", 5)).await.unwrap();

        let filter = AssetFilter {
            document_name: Some(RegexBuilder::new(r"\.epub$").case_insensitive(true).build().unwrap()),
        };
        let ids: Vec<String> = store.list(&filter).await.unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["old", "new"]);
        assert_eq!(store.list(&AssetFilter::default()).await.unwrap().len(), 3);
    }
}
