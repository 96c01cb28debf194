pub mod json;

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{QueueError, QueueResult};

/// Trait for message payload codecs
pub trait MessageCodec: Send + Sync {
    fn encode_value(&self, value: &serde_json::Value) -> QueueResult<Vec<u8>>;

    fn decode_value(&self, bytes: &[u8]) -> QueueResult<serde_json::Value>;

    fn codec_id(&self) -> &'static str;
}

/// Registry for managing different codecs
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn MessageCodec>>,
    default_codec: String,
}

impl CodecRegistry {
    /// Create a new codec registry with JSON as default
    pub fn new() -> Self {
        let mut registry = Self {
            codecs: HashMap::new(),
            default_codec: "json".to_string(),
        };
        registry.register(Arc::new(json::JsonCodec));
        registry
    }

    pub fn register(&mut self, codec: Arc<dyn MessageCodec>) {
        let codec_id = codec.codec_id().to_string();
        self.codecs.insert(codec_id, codec);
    }

    pub fn get_codec(&self, codec_id: &str) -> QueueResult<Arc<dyn MessageCodec>> {
        self.codecs
            .get(codec_id)
            .cloned()
            .ok_or_else(|| QueueError::CodecNotFound(codec_id.to_string()))
    }

    pub fn default_codec(&self) -> QueueResult<Arc<dyn MessageCodec>> {
        self.get_codec(&self.default_codec)
    }

    pub fn set_default_codec(&mut self, codec_id: &str) -> QueueResult<()> {
        if self.codecs.contains_key(codec_id) {
            self.default_codec = codec_id.to_string();
            Ok(())
        } else {
            Err(QueueError::CodecNotFound(codec_id.to_string()))
        }
    }

    /// Encode with the default codec; returns the codec id alongside the bytes
    pub fn encode<T: Serialize + ?Sized>(&self, body: &T) -> QueueResult<(String, Vec<u8>)> {
        let codec = self.default_codec()?;
        let value = serde_json::to_value(body)?;
        Ok((codec.codec_id().to_string(), codec.encode_value(&value)?))
    }

    pub fn decode<T: DeserializeOwned>(&self, codec_id: &str, bytes: &[u8]) -> QueueResult<T> {
        let value = self.get_codec(codec_id)?.decode_value(bytes)?;
        Ok(serde_json::from_value(value)?)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
