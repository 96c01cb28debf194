use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shelf_core::errors::ShelfError;

#[derive(Debug)]
pub struct ShelfAxumError(pub anyhow::Error);

impl From<anyhow::Error> for ShelfAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<ShelfError> for ShelfAxumError {
    fn from(e: ShelfError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for ShelfAxumError {
    fn into_response(self) -> Response {
        // Preserve Feathers-ish fields even when wrapped by anyhow contexts.
        let safe = match self.0.chain().find_map(|e| e.downcast_ref::<ShelfError>()) {
            Some(shelf) => shelf.sanitize_for_client(),
            None => ShelfError::general_error(self.0.to_string()),
        };

        if safe.code() >= 500 {
            tracing::error!(error = %self.0, name = safe.name(), "request failed");
        } else {
            tracing::debug!(error = %safe, "request rejected");
        }

        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
