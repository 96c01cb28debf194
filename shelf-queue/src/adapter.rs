use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::{
    backend::QueueBackend, codec::CodecRegistry, LeaseToken, MessageId, QueueError,
    QueueMessage, QueueOptions, QueueResult,
};

/// AMQP caps queue names at 255 bytes; the same limit applies to every backend.
const MAX_QUEUE_NAME_BYTES: usize = 255;

/// Configuration for queue adapter
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Largest encoded payload accepted by `send_json`
    pub max_payload_bytes: usize,
    /// Declare the target queue before every send
    pub declare_on_send: bool,
    /// Options used for implicit declarations
    pub queue_options: QueueOptions,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024,
            declare_on_send: true,
            queue_options: QueueOptions::default(),
        }
    }
}

/// A decoded message leased from a queue
#[derive(Debug, Clone)]
pub struct Received<T> {
    pub message_id: MessageId,
    pub queue: String,
    pub lease_token: LeaseToken,
    pub delivery_count: u32,
    pub body: T,
}

/// Encodes bodies and talks to a [`QueueBackend`]
#[derive(Clone)]
pub struct QueueAdapter {
    backend: Arc<dyn QueueBackend>,
    codecs: Arc<CodecRegistry>,
    config: QueueConfig,
}

impl QueueAdapter {
    pub fn new<B: QueueBackend + 'static>(backend: B) -> Self {
        Self::with_config(backend, QueueConfig::default())
    }

    pub fn with_config<B: QueueBackend + 'static>(backend: B, config: QueueConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            codecs: Arc::new(CodecRegistry::new()),
            config,
        }
    }

    pub fn with_codec_registry(mut self, registry: CodecRegistry) -> Self {
        self.codecs = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn validate_queue_name(queue: &str) -> QueueResult<()> {
        if queue.trim().is_empty() || queue.len() > MAX_QUEUE_NAME_BYTES {
            return Err(QueueError::InvalidQueueName(queue.to_string()));
        }
        Ok(())
    }

    pub async fn declare_queue(&self, queue: &str) -> QueueResult<()> {
        Self::validate_queue_name(queue)?;
        self.backend.declare(queue, self.config.queue_options).await
    }

    /// Encode `body` and send it as a persistent message
    #[instrument(skip(self, body), fields(queue = %queue))]
    pub async fn send_json<T: Serialize + ?Sized>(
        &self,
        queue: &str,
        body: &T,
    ) -> QueueResult<MessageId> {
        Self::validate_queue_name(queue)?;
        let (codec, payload) = self.codecs.encode(body)?;
        if payload.len() > self.config.max_payload_bytes {
            return Err(QueueError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_bytes,
            });
        }

        if self.config.declare_on_send {
            self.backend.declare(queue, self.config.queue_options).await?;
        }

        let message = QueueMessage::new(queue.to_string(), payload, codec)
            .with_persistent(self.config.queue_options.durable);
        let id = self.backend.send(message).await?;
        debug!(message_id = %id, "sent message");
        Ok(id)
    }

    /// Lease and decode the next message, if any
    pub async fn receive_json<T: DeserializeOwned>(
        &self,
        queue: &str,
    ) -> QueueResult<Option<Received<T>>> {
        let Some(delivery) = self.backend.receive(queue).await? else {
            return Ok(None);
        };
        let message = delivery.message;
        let body = match self.codecs.decode::<T>(&message.codec, &message.payload_bytes) {
            Ok(body) => body,
            Err(err) => {
                // Leave undecodable messages for another consumer.
                self.backend.requeue(queue, &delivery.lease_token).await?;
                return Err(err);
            }
        };

        Ok(Some(Received {
            message_id: message.message_id,
            queue: message.queue,
            lease_token: delivery.lease_token,
            delivery_count: message.delivery_count,
            body,
        }))
    }

    pub async fn ack<T>(&self, received: &Received<T>) -> QueueResult<()> {
        self.backend.ack(&received.queue, &received.lease_token).await
    }

    pub async fn requeue<T>(&self, received: &Received<T>) -> QueueResult<()> {
        self.backend
            .requeue(&received.queue, &received.lease_token)
            .await
    }

    pub async fn depth(&self, queue: &str) -> QueueResult<usize> {
        self.backend.depth(queue).await
    }
}
