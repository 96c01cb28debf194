//! # shelf-queue: durable named queues
//!
//! Producers send JSON bodies to named, durable queues as persistent messages;
//! consumers lease messages one at a time and ack or requeue them.
//!
//! ```rust
//! use shelf_queue::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> QueueResult<()> {
//! let queue = QueueAdapter::new(MemoryBackend::new());
//! queue.send_json("file_events", &serde_json::json!({ "topic": "asset.created" })).await?;
//!
//! let received = queue.receive_json::<serde_json::Value>("file_events").await?.unwrap();
//! assert_eq!(received.body["topic"], "asset.created");
//! queue.ack(&received).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod backend;
pub mod codec;
pub mod error;
pub mod types;

pub use adapter::{QueueAdapter, QueueConfig, Received};
pub use backend::{memory::MemoryBackend, QueueBackend};
pub use codec::{json::JsonCodec, CodecRegistry, MessageCodec};
pub use error::{QueueError, QueueResult};
pub use types::{Delivery, LeaseToken, MessageId, QueueMessage, QueueOptions};

pub mod prelude {
    pub use crate::{
        MemoryBackend, QueueAdapter, QueueBackend, QueueConfig, QueueError, QueueResult,
        Received,
    };
}
