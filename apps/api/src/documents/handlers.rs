//! Axum route handlers for document upload and extraction.

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::documents::{
    extract, is_supported, supported_extensions, supported_mime_types, DocumentMetadata,
    MAX_UPLOAD_BYTES, MAX_UPLOAD_LABEL,
};
use crate::errors::AppError;

/// Name of the multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Body limit for the upload route. Leaves room for multipart framing so the handler,
/// not the transport, reports uploads just over `MAX_UPLOAD_BYTES`.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A multipart upload as the client declared it. Transient: lives for one request.
#[derive(Debug)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct ParseFileResponse {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub filename: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedFormatsResponse {
    pub supported_extensions: Vec<&'static str>,
    pub supported_mime_types: Vec<&'static str>,
    pub max_file_size: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/file/parse
///
/// Checks run in order: file present, format supported, size within limit. Only then
/// is the document decoded, on the blocking pool.
pub async fn handle_parse_file(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ParseFileResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    })?;
    let upload = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    if !is_supported(&upload.filename, &upload.content_type) {
        return Err(AppError::UnsupportedFormat(upload.filename));
    }

    let size = upload.bytes.len();
    if size > MAX_UPLOAD_BYTES {
        warn!(filename = %upload.filename, size, "Rejected oversized upload");
        return Err(AppError::PayloadTooLarge);
    }

    let UploadedDocument {
        filename,
        content_type,
        bytes,
    } = upload;
    let (parsed, filename, content_type) = tokio::task::spawn_blocking(move || {
        let parsed = extract(&bytes, &filename, &content_type);
        (parsed, filename, content_type)
    })
    .await
    .map_err(anyhow::Error::from)?;
    let parsed = parsed?;

    info!(
        %filename,
        size,
        has_metadata = !parsed.metadata.is_empty(),
        "Parsed uploaded document"
    );

    Ok(Json(ParseFileResponse {
        content: parsed.content,
        metadata: parsed.metadata,
        filename,
        size,
        content_type,
    }))
}

/// GET /api/file/parse
///
/// Advertises what the upload endpoint accepts.
pub async fn handle_supported_formats() -> Json<SupportedFormatsResponse> {
    Json(SupportedFormatsResponse {
        supported_extensions: supported_extensions(),
        supported_mime_types: supported_mime_types(),
        max_file_size: MAX_UPLOAD_LABEL,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart helpers
// ────────────────────────────────────────────────────────────────────────────

/// Returns the first `file` field, skipping any others. `None` when the form has none.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<UploadedDocument>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        return read_file_field(field).await.map(Some);
    }
    Ok(None)
}

async fn read_file_field(field: Field<'_>) -> Result<UploadedDocument, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(UploadedDocument {
        filename,
        content_type,
        bytes,
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}
