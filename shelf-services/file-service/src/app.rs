use std::sync::Arc;

use shelf_axum::middlewares::MultipartConfig;
use shelf_axum::AxumApp;
use shelf_core::ShelfConfigSnapshot;
use shelf_queue::QueueAdapter;

use crate::services::assets::{assets_routes, AssetCoordinator, AssetsHttpState, COVER_FIELDS, DOCUMENT_FIELDS};
use crate::services::messages::messages_routes;

const MB: usize = 1024 * 1024;

pub fn multipart_config(config: &ShelfConfigSnapshot) -> MultipartConfig {
    let max_file_mb = config.get_usize("multipart.max_file_size_mb").unwrap_or(100);
    let max_total_mb = config.get_usize("multipart.max_total_size_mb").unwrap_or(200);

    DOCUMENT_FIELDS.iter().chain(COVER_FIELDS).fold(
        MultipartConfig::new()
            .max_file_size(max_file_mb * MB)
            .max_total_size(max_total_mb * MB),
        |cfg, field| cfg.file_field(field),
    )
}

/// Mount every route of the file service
pub fn file_app(
    config: &ShelfConfigSnapshot,
    coordinator: Arc<AssetCoordinator>,
    queue: QueueAdapter,
) -> AxumApp {
    let assets = AssetsHttpState {
        coordinator,
        multipart: multipart_config(config),
    };

    AxumApp::new()
        .use_router("/assets", assets_routes::router(assets))
        .use_router("/messages", messages_routes::router(queue))
        .service("/health", || async { "ok" })
        .with_permissive_cors(config.get_bool("http.cors").unwrap_or(true))
}
