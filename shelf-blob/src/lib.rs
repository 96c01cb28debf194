//! # shelf-blob: blob storage for shelf services
//!
//! ```text
//! ┌─────────────────┐
//! │   Your Service  │  ← Business logic only
//! ├─────────────────┤
//! │   BlobAdapter   │  ← Namespaces, unique keys, size guard, URLs
//! ├─────────────────┤
//! │   BlobStore     │  ← Storage primitives (S3-compatible, memory)
//! └─────────────────┘
//! ```
//!
//! `BlobAdapter` is infrastructure, not a service: services embed it and hand it
//! a namespace and a filename; it returns a [`StoredBlob`] whose `locator` never
//! collides with any other upload.
//!
//! ```rust
//! use shelf_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let blobs = BlobAdapter::new(MemoryBlobStore::new(), BlobConfig::default());
//! let put = BlobPut::new("cover_images", "cover.png").with_content_type("image/png");
//! let stored = blobs.store(put, bytes::Bytes::from_static(b"png")).await?;
//! assert!(stored.locator.starts_with("cover_images/"));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
mod config;
mod error;
mod memory_store;
mod receipt;
mod s3_store;
pub mod store;
mod types;

pub use adapter::BlobAdapter;
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use memory_store::MemoryBlobStore;
pub use receipt::{FetchedBlob, StoredBlob};
pub use s3_store::{S3CompatibleStore, S3Config};
pub use store::{BlobKeyStrategy, BlobStore, DefaultKeyStrategy, GetResult, ObjectHead, PutResult};
pub use types::{byte_stream, BlobId, BlobPut, ByteStream, DeleteOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobConfig, BlobError, BlobPut, BlobResult, BlobStore, DeleteOutcome,
        MemoryBlobStore, StoredBlob,
    };
}
