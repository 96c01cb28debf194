//! shelf-axum: Axum adapter for shelf services.
//!
//! Builds the HTTP surface: an [`AxumApp`] router builder with request ids and
//! tracing, Feathers-style JSON error responses, and multer-based multipart parsing.

pub mod app;
pub mod middlewares;
mod error;
pub use error::ShelfAxumError;

pub use app::{AxumApp, REQUEST_ID_HEADER};
pub use axum;
