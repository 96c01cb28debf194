use std::sync::Arc;

use shelf_core::{EventHub, ListenerId};
use shelf_queue::QueueAdapter;
use tracing::debug;

/// Forward every `asset.*` event to a durable queue as `{topic, payload, emittedAt}`.
pub fn configure(hub: &EventHub, queue: QueueAdapter, queue_name: &str) -> ListenerId {
    let queue_name: Arc<str> = Arc::from(queue_name);
    hub.on("asset.*", move |event| {
        let queue = queue.clone();
        let queue_name = Arc::clone(&queue_name);
        async move {
            let id = queue.send_json(&queue_name, event.as_ref()).await?;
            debug!(topic = %event.topic, message_id = %id, "event forwarded to queue");
            Ok::<_, anyhow::Error>(())
        }
    })
}
