use std::env;

use shelf_core::ShelfConfig;

/// Configure all application settings from the environment
pub fn config(config: &mut ShelfConfig) {
    // HTTP Server Configuration
    configure_http(config);

    // Blob storage
    configure_blobs(config);

    // Asset lifecycle rules
    configure_assets(config);

    // Multipart limits
    configure_multipart(config);

    // `SHELF__A__B` overrides win over everything above
    config.load_env_prefixed("SHELF");
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Configure HTTP server settings
fn configure_http(config: &mut ShelfConfig) {
    config.set("http.host", env_or("HTTP_HOST", "127.0.0.1"));
    config.set("http.port", env_or("HTTP_PORT", "5003"));
    config.set("http.cors", env_or("HTTP_CORS", "true"));
}

/// Configure the blob backend; `S3_*` variables are read by the S3 store itself
fn configure_blobs(config: &mut ShelfConfig) {
    config.set("blob.backend", env_or("BLOB_BACKEND", "memory"));
    if let Ok(base) = env::var("BLOB_PUBLIC_BASE_URL") {
        config.set("blob.public_base_url", base);
    }
    if let Ok(max) = env::var("BLOB_MAX_BYTES") {
        config.set("blob.max_bytes", max);
    }
}

fn configure_assets(config: &mut ShelfConfig) {
    config.set(
        "assets.document_namespace",
        env_or("ASSETS_DOCUMENT_NAMESPACE", "epub_files"),
    );
    config.set(
        "assets.cover_namespace",
        env_or("ASSETS_COVER_NAMESPACE", "cover_images"),
    );
    config.set(
        "assets.document_content_type",
        env_or("ASSETS_DOCUMENT_TYPE", "application/epub+zip"),
    );
    config.set("assets.list_pattern", env_or("ASSETS_LIST_PATTERN", r"\.epub$"));
    config.set(
        "assets.serialize_per_id",
        env_or("ASSETS_SERIALIZE_PER_ID", "true"),
    );
    config.set("assets.events_queue", env_or("ASSETS_EVENTS_QUEUE", "file_events"));
}

fn configure_multipart(config: &mut ShelfConfig) {
    config.set(
        "multipart.max_file_size_mb",
        env_or("MULTIPART_MAX_FILE_SIZE_MB", "100"),
    );
    config.set(
        "multipart.max_total_size_mb",
        env_or("MULTIPART_MAX_TOTAL_SIZE_MB", "200"),
    );
}
