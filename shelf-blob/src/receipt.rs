use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Receipt returned after successfully storing a blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Object key; unique across all time
    pub locator: String,
    pub retrieval_url: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Full content of a stored blob
#[derive(Debug, Clone)]
pub struct FetchedBlob {
    pub locator: String,
    pub bytes: Bytes,
    pub content_type: Option<String>,
}
