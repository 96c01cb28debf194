use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_core::ShelfError;
use shelf_queue::QueueError;

/// Body of `POST /messages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessage {
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl SendMessage {
    /// Queue name and message, or the 400 to answer with
    pub fn into_parts(self) -> Result<(String, Value), ShelfError> {
        let queue = self
            .queue
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        let message = self.message.filter(|m| !m.is_null());
        match (queue, message) {
            (Some(queue), Some(message)) => Ok((queue, message)),
            _ => Err(ShelfError::bad_request("Queue and message are required")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageSent {
    pub success: bool,
    pub message_id: String,
}

pub fn queue_error(err: QueueError) -> ShelfError {
    match err {
        QueueError::InvalidQueueName(_)
        | QueueError::PayloadTooLarge { .. }
        | QueueError::SerializationError(_) => ShelfError::bad_request(err.to_string()),
        other => ShelfError::unavailable("Message queue is unavailable")
            .with_source(anyhow::Error::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shelf_core::ErrorKind;

    #[test]
    fn queue_and_message_are_both_required() {
        let missing_queue: SendMessage = serde_json::from_value(json!({ "message": "hi" })).unwrap();
        assert_eq!(missing_queue.into_parts().unwrap_err().kind, ErrorKind::BadRequest);

        let blank_queue: SendMessage =
            serde_json::from_value(json!({ "queue": "  ", "message": {"a": 1} })).unwrap();
        assert!(blank_queue.into_parts().is_err());

        let ok: SendMessage =
            serde_json::from_value(json!({ "queue": "jobs", "message": {"a": 1} })).unwrap();
        let (queue, message) = ok.into_parts().unwrap();
        assert_eq!(queue, "jobs");
        assert_eq!(message["a"], 1);
    }

    #[test]
    fn backend_failures_are_unavailable() {
        let err = queue_error(QueueError::Unavailable("down".into()));
        assert_eq!(err.kind, ErrorKind::Unavailable);
        let err = queue_error(QueueError::PayloadTooLarge { size: 10, max: 1 });
        assert_eq!(err.kind, ErrorKind::BadRequest);
    }
}
