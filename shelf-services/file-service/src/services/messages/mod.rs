pub mod messages_routes;
pub mod messages_shared;

pub use messages_shared::{MessageSent, SendMessage};
