use async_trait::async_trait;

use crate::{BlobResult, ByteStream, DeleteOutcome};

/// Core blob storage operations - must be implemented by all storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob from a stream
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult>;

    /// Get a blob as a stream
    async fn get(&self, key: &str) -> BlobResult<GetResult>;

    /// Get blob metadata without content
    async fn head(&self, key: &str) -> BlobResult<ObjectHead>;

    /// Delete a blob. A missing key is reported, not raised.
    async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome>;

    /// Publicly reachable URL for a stored key, when the backend has one
    fn public_url(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: Option<String>,
    pub size_bytes: u64,
}

/// Result of a get operation
pub struct GetResult {
    pub stream: ByteStream,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Metadata about a blob
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<i64>,
}

/// Strategy for generating blob keys
pub trait BlobKeyStrategy: Send + Sync {
    /// Generate a key for a new object; must differ for every `blob_id`
    fn object_key(&self, namespace: &str, blob_id: &str, filename: &str) -> String;
}

/// Default key strategy: `namespace/<blob_id>-<sanitized filename>`
#[derive(Debug, Clone)]
pub struct DefaultKeyStrategy;

const MAX_NAME_CHARS: usize = 128;

impl DefaultKeyStrategy {
    /// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
    pub fn sanitize(filename: &str) -> String {
        let base = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .trim();

        let cleaned: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .take(MAX_NAME_CHARS)
            .collect();

        let cleaned = cleaned.trim_start_matches('.').to_string();
        if cleaned.is_empty() {
            "file".to_string()
        } else {
            cleaned
        }
    }
}

impl BlobKeyStrategy for DefaultKeyStrategy {
    fn object_key(&self, namespace: &str, blob_id: &str, filename: &str) -> String {
        let namespace = namespace.trim_matches('/');
        format!("{}/{}-{}", namespace, blob_id, Self::sanitize(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_and_keep_a_readable_name() {
        let key = DefaultKeyStrategy.object_key("epub_files/", "1234", "My Book.epub");
        assert_eq!(key, "epub_files/1234-My_Book.epub");
    }

    #[test]
    fn sanitize_strips_paths_and_hidden_prefixes() {
        assert_eq!(DefaultKeyStrategy::sanitize("../../etc/passwd"), "passwd");
        assert_eq!(DefaultKeyStrategy::sanitize("C:\\covers\\a b.png"), "a_b.png");
        assert_eq!(DefaultKeyStrategy::sanitize(".hidden"), "hidden");
        assert_eq!(DefaultKeyStrategy::sanitize("   "), "file");
        assert_eq!(DefaultKeyStrategy::sanitize("книга.epub"), "_____.epub");
    }

    #[test]
    fn long_names_are_capped() {
        let long = "a".repeat(500);
        assert_eq!(DefaultKeyStrategy::sanitize(&long).len(), MAX_NAME_CHARS);
    }
}
