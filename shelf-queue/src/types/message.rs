use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LeaseToken, MessageId};

/// Queue message - immutable once sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub message_id: MessageId,

    /// Target queue name
    pub queue: String,

    /// Serialized payload (opaque bytes)
    pub payload_bytes: Vec<u8>,

    /// Codec used for serialization
    pub codec: String,

    /// Survives a broker restart when the queue is durable
    pub persistent: bool,

    pub enqueued_at: DateTime<Utc>,

    /// How many times the message has been handed out
    pub delivery_count: u32,
}

impl QueueMessage {
    pub fn new(queue: String, payload_bytes: Vec<u8>, codec: String) -> Self {
        Self {
            message_id: MessageId::new(),
            queue,
            payload_bytes,
            codec,
            persistent: true,
            enqueued_at: Utc::now(),
            delivery_count: 0,
        }
    }

    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn payload_size(&self) -> usize {
        self.payload_bytes.len()
    }
}

/// A message leased to one consumer until acked or requeued
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: QueueMessage,
    pub lease_token: LeaseToken,
}

/// Declaration options for a named queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    pub durable: bool,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self { durable: true }
    }
}
