use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shelf_axum::middlewares::{parse_multipart, MultipartConfig, MultipartForm, UploadedFile};
use shelf_axum::ShelfAxumError;
use shelf_core::ShelfError;

use super::assets_coordinator::AssetCoordinator;
use super::assets_shared::{AssetChanges, AssetPart, FilePayload, NewAsset};

pub const DOCUMENT_FIELDS: &[&str] = &["document", "epub"];
pub const COVER_FIELDS: &[&str] = &["cover", "coverImage"];

const MAX_JSON_BODY: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AssetsHttpState {
    pub coordinator: Arc<AssetCoordinator>,
    pub multipart: MultipartConfig,
}

type HttpResult<T> = Result<T, ShelfAxumError>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub document_name: Option<String>,
}

pub fn router(state: AssetsHttpState) -> Router<()> {
    Router::new()
        .route("/", get(list_assets).post(upload_asset))
        .route(
            "/{id}",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route("/{id}/document", get(download_document))
        .route("/{id}/cover", get(download_cover))
        .with_state(state)
}

fn file_payload(file: UploadedFile) -> FilePayload {
    let filename = file.filename.unwrap_or_else(|| file.field.clone());
    let content_type = file
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    FilePayload::new(filename, content_type, file.data)
}

fn text(form: &MultipartForm, name: &str) -> Option<String> {
    form.text(name).map(str::to_string)
}

async fn upload_asset(
    State(state): State<AssetsHttpState>,
    headers: HeaderMap,
    body: Body,
) -> HttpResult<(StatusCode, Response)> {
    let mut form = parse_multipart(&headers, body, &state.multipart).await?;

    let input = NewAsset {
        document: form.take_file(DOCUMENT_FIELDS).map(file_payload),
        cover: form.take_file(COVER_FIELDS).map(file_payload),
        title: text(&form, "title"),
        author: text(&form, "author"),
        description: text(&form, "description"),
    };

    let asset = state
        .coordinator
        .upload(input)
        .await
        .map_err(ShelfError::from)?;
    Ok((StatusCode::CREATED, Json(asset).into_response()))
}

async fn list_assets(
    State(state): State<AssetsHttpState>,
    Query(query): Query<ListQuery>,
) -> HttpResult<Response> {
    let assets = state
        .coordinator
        .list(query.document_name.as_deref())
        .await
        .map_err(ShelfError::from)?;
    Ok(Json(assets).into_response())
}

async fn get_asset(
    State(state): State<AssetsHttpState>,
    Path(id): Path<String>,
) -> HttpResult<Response> {
    let asset = state.coordinator.get(&id).await.map_err(ShelfError::from)?;
    Ok(Json(asset).into_response())
}

/// Multipart for file replacements, JSON for text-only changes.
async fn update_asset(
    State(state): State<AssetsHttpState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> HttpResult<Response> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false);

    let changes = if is_json {
        let bytes = axum::body::to_bytes(body, MAX_JSON_BODY)
            .await
            .map_err(|e| ShelfError::bad_request(format!("Failed to read request body: {e}")))?;
        serde_json::from_slice::<AssetChanges>(&bytes)
            .map_err(|e| ShelfError::bad_request(format!("Invalid JSON body: {e}")))?
    } else {
        let mut form = parse_multipart(&headers, body, &state.multipart).await?;
        AssetChanges {
            document: form.take_file(DOCUMENT_FIELDS).map(file_payload),
            cover: form.take_file(COVER_FIELDS).map(file_payload),
            title: text(&form, "title"),
            author: text(&form, "author"),
            description: text(&form, "description"),
        }
    };

    let asset = state
        .coordinator
        .update(&id, changes)
        .await
        .map_err(ShelfError::from)?;
    Ok(Json(asset).into_response())
}

async fn delete_asset(
    State(state): State<AssetsHttpState>,
    Path(id): Path<String>,
) -> HttpResult<Response> {
    let deleted = state
        .coordinator
        .delete(&id)
        .await
        .map_err(ShelfError::from)?;
    Ok(Json(deleted).into_response())
}

async fn download(state: &AssetsHttpState, id: &str, part: AssetPart) -> HttpResult<Response> {
    let fetched = state
        .coordinator
        .read_file(id, part)
        .await
        .map_err(ShelfError::from)?;
    let content_type = fetched
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], fetched.bytes).into_response())
}

async fn download_document(
    State(state): State<AssetsHttpState>,
    Path(id): Path<String>,
) -> HttpResult<Response> {
    download(&state, &id, AssetPart::Document).await
}

async fn download_cover(
    State(state): State<AssetsHttpState>,
    Path(id): Path<String>,
) -> HttpResult<Response> {
    download(&state, &id, AssetPart::Cover).await
}
