use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use uuid::Uuid;

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Wrap an in-memory buffer as a single-chunk stream.
pub fn byte_stream(body: Bytes) -> ByteStream {
    Box::pin(futures::stream::once(async move { Ok(body) }))
}

/// Unique token embedded in every object key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(pub String);

impl BlobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to store a blob
#[derive(Debug, Clone)]
pub struct BlobPut {
    /// Logical folder the object lands in, e.g. `epub_files`
    pub namespace: String,
    /// Name supplied by the uploader, kept as a readable key suffix
    pub filename: String,
    pub content_type: Option<String>,
}

impl BlobPut {
    pub fn new<N: Into<String>, F: Into<String>>(namespace: N, filename: F) -> Self {
        Self {
            namespace: namespace.into(),
            filename: filename.into(),
            content_type: None,
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Outcome of a delete. Absence is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}
