pub mod assets_coordinator;
pub mod assets_locks;
pub mod assets_routes;
pub mod assets_shared;
pub mod assets_store;

pub use assets_coordinator::AssetCoordinator;
pub use assets_locks::AssetLocks;
pub use assets_routes::{AssetsHttpState, COVER_FIELDS, DOCUMENT_FIELDS};
pub use assets_shared::{
    Asset, AssetChanges, AssetError, AssetFile, AssetOperation, AssetPart, AssetSettings,
    DeletedAsset, FilePayload, NewAsset, PartialFailureReport, EVENT_CREATED, EVENT_DELETED,
    EVENT_UPDATED,
};
pub use assets_store::{AssetFilter, AssetRecordStore, MemoryAssetStore, RecordError, RecordResult};
