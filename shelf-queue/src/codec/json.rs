use crate::{codec::MessageCodec, QueueResult};

/// JSON codec for message bodies
#[derive(Debug, Clone)]
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
    fn encode_value(&self, value: &serde_json::Value) -> QueueResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode_value(&self, bytes: &[u8]) -> QueueResult<serde_json::Value> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn codec_id(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodecRegistry, QueueError};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Notice {
        id: String,
        title: String,
    }

    #[test]
    fn registry_decodes_what_it_encodes() {
        let registry = CodecRegistry::new();
        let notice = Notice {
            id: "a1".into(),
            title: "Dune".into(),
        };
        let (codec, bytes) = registry.encode(&notice).unwrap();
        assert_eq!(codec, "json");
        assert_eq!(registry.decode::<Notice>(&codec, &bytes).unwrap(), notice);
    }

    #[test]
    fn garbage_bytes_are_a_serialization_error() {
        let err = JsonCodec.decode_value(b"{not json").unwrap_err();
        assert!(matches!(err, QueueError::SerializationError(_)));
    }

    #[test]
    fn unknown_codec_is_reported() {
        let mut registry = CodecRegistry::new();
        assert!(matches!(
            registry.set_default_codec("msgpack"),
            Err(QueueError::CodecNotFound(id)) if id == "msgpack"
        ));
    }
}
