use std::collections::{HashMap, HashSet};

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use bytes::Bytes;
use multer::{Constraints, Multipart, SizeLimit};
use serde_json::json;
use shelf_core::ShelfError;

/// Limits and field classification for multipart parsing
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum size of any single field in bytes
    pub max_file_size: usize,
    /// Maximum total request size in bytes
    pub max_total_size: usize,
    /// Field names always treated as files, even without a filename
    pub file_fields: HashSet<String>,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,  // 100MB
            max_total_size: 200 * 1024 * 1024, // 200MB
            file_fields: HashSet::new(),
        }
    }
}

impl MultipartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn max_total_size(mut self, size: usize) -> Self {
        self.max_total_size = size;
        self
    }

    pub fn file_field(mut self, field_name: &str) -> Self {
        self.file_fields.insert(field_name.to_string());
        self
    }
}

/// One uploaded file part, fully buffered
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Parsed multipart/form-data body
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    pub files: HashMap<String, UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    /// First present file among `names` (lets callers accept field aliases)
    pub fn take_file(&mut self, names: &[&str]) -> Option<UploadedFile> {
        names.iter().find_map(|name| self.files.remove(*name))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }
}

fn field_error(message: String) -> ShelfError {
    ShelfError::bad_request(message)
}

fn map_multer_error(err: multer::Error) -> ShelfError {
    match err {
        multer::Error::StreamSizeExceeded { limit } => field_error(format!(
            "Request body exceeds maximum size of {} bytes",
            limit
        )),
        multer::Error::FieldSizeExceeded { limit, field_name } => field_error(format!(
            "Field '{}' exceeds maximum size of {} bytes",
            field_name.unwrap_or_default(),
            limit
        )),
        other => ShelfError::bad_request("Failed to parse multipart data")
            .with_errors(json!({ "_multipart": [other.to_string()] })),
    }
}

/// Parse a multipart/form-data request body with multer.
///
/// Parts with a filename (or listed in `file_fields`) become files; the rest
/// are read as UTF-8 text. Later duplicates of a field name win.
pub async fn parse_multipart(
    headers: &HeaderMap,
    body: Body,
    config: &MultipartConfig,
) -> Result<MultipartForm, ShelfError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !content_type.starts_with("multipart/form-data") {
        return Err(ShelfError::bad_request(
            "Expected a multipart/form-data request body",
        ));
    }

    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ShelfError::bad_request("Missing boundary in multipart content-type"))?;

    let constraints = Constraints::new().size_limit(
        SizeLimit::new()
            .whole_stream(config.max_total_size as u64)
            .per_field(config.max_file_size as u64),
    );
    let mut multipart = Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut form = MultipartForm::default();
    while let Some(field) = multipart.next_field().await.map_err(map_multer_error)? {
        let name = field.name().unwrap_or("unknown").to_string();
        let filename = field.file_name().map(|f| f.to_string());
        let content_type = field.content_type().map(|ct| ct.to_string());

        let is_file = filename.is_some() || config.file_fields.contains(&name);
        if is_file {
            let data = field.bytes().await.map_err(map_multer_error)?;
            tracing::debug!(field = %name, size = data.len(), "multipart file field");
            form.files.insert(
                name.clone(),
                UploadedFile {
                    field: name,
                    filename,
                    content_type,
                    data,
                },
            );
        } else {
            let value = field.text().await.map_err(map_multer_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
