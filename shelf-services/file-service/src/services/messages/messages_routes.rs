use axum::{extract::State, routing::post, Json, Router};
use shelf_axum::ShelfAxumError;
use shelf_queue::QueueAdapter;
use tracing::info;

use super::messages_shared::{queue_error, MessageSent, SendMessage};

pub fn router(queue: QueueAdapter) -> Router<()> {
    Router::new().route("/", post(send_message)).with_state(queue)
}

async fn send_message(
    State(queue): State<QueueAdapter>,
    Json(body): Json<SendMessage>,
) -> Result<Json<MessageSent>, ShelfAxumError> {
    let (name, message) = body.into_parts()?;
    let id = queue.send_json(&name, &message).await.map_err(queue_error)?;
    info!(queue = %name, message_id = %id, "message sent");
    Ok(Json(MessageSent {
        success: true,
        message_id: id.to_string(),
    }))
}
