pub mod ids;
pub mod message;

pub use ids::{LeaseToken, MessageId};
pub use message::{Delivery, QueueMessage, QueueOptions};
