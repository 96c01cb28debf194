pub mod memory;

use async_trait::async_trait;

use crate::{Delivery, LeaseToken, MessageId, QueueMessage, QueueOptions, QueueResult};

/// Backend trait for queue storage primitives
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Declare a queue; declaring an existing queue is a no-op
    async fn declare(&self, queue: &str, options: QueueOptions) -> QueueResult<()>;

    /// Append a message to a declared queue
    async fn send(&self, message: QueueMessage) -> QueueResult<MessageId>;

    /// Lease the oldest ready message, if any
    async fn receive(&self, queue: &str) -> QueueResult<Option<Delivery>>;

    /// Acknowledge a delivery; the message is gone for good
    async fn ack(&self, queue: &str, lease_token: &LeaseToken) -> QueueResult<()>;

    /// Return a leased message to the front of its queue
    async fn requeue(&self, queue: &str, lease_token: &LeaseToken) -> QueueResult<()>;

    /// Ready (not leased) message count
    async fn depth(&self, queue: &str) -> QueueResult<usize>;
}
