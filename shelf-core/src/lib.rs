//! shelf-core: framework-agnostic errors, events and configuration for shelf services.

pub mod config;
pub mod errors;
pub mod events;

pub use config::{ShelfConfig, ShelfConfigSnapshot};
pub use errors::{ErrorKind, ShelfError};
pub use events::{EventHub, EventPublisher, LifecycleEvent, ListenerId, TopicPattern};
