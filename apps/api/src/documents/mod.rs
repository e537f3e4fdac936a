//! Document extraction. Turns an uploaded file into plain text plus best-effort metadata.
//!
//! Dispatch is a closed match over `DocumentFormat`; each format owns one decode function.
//! The extractor is pure: it reads the supplied buffer and nothing else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub mod docx;
pub mod format;
pub mod handlers;
pub mod pdf;
pub mod text;

pub use format::{is_supported, supported_extensions, supported_mime_types, DocumentFormat};

/// Upload ceiling enforced by the HTTP boundary before extraction.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Human-readable form of `MAX_UPLOAD_BYTES`, advertised to clients.
pub const MAX_UPLOAD_LABEL: &str = "10MB";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {filename} ({mime_type})")]
    UnsupportedFormat { filename: String, mime_type: String },

    #[error("Failed to parse {format}: {cause}")]
    ExtractionFailed {
        format: DocumentFormat,
        cause: String,
    },

    #[error("Failed to parse doc: {cause}. Note: Some older DOC formats may not be supported.")]
    LegacyDocUnsupported { cause: String },
}

/// Descriptive fields recovered from the document. All optional; PDF is the only
/// format that currently fills any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        *self == DocumentMetadata::default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Classifies and decodes a document in one step.
pub fn extract(
    bytes: &[u8],
    filename: &str,
    declared_mime: &str,
) -> Result<ParsedDocument, ExtractError> {
    let format = DocumentFormat::classify(filename, declared_mime)?;
    extract_as(format, bytes)
}

/// Decodes `bytes` as the given format.
pub fn extract_as(format: DocumentFormat, bytes: &[u8]) -> Result<ParsedDocument, ExtractError> {
    let parsed = match format {
        DocumentFormat::Pdf => pdf::extract_pdf(bytes),
        DocumentFormat::Docx => docx::extract_docx(bytes),
        DocumentFormat::Doc => docx::extract_legacy_doc(bytes),
        DocumentFormat::Txt | DocumentFormat::Md => Ok(text::extract_text(bytes)),
    }?;

    debug!(
        %format,
        bytes = bytes.len(),
        chars = parsed.content.chars().count(),
        "Document extracted"
    );

    Ok(parsed)
}
