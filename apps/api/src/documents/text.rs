use crate::documents::{DocumentMetadata, ParsedDocument};

/// Plain text and Markdown pass straight through. Invalid UTF-8 becomes U+FFFD.
pub fn extract_text(bytes: &[u8]) -> ParsedDocument {
    ParsedDocument {
        content: String::from_utf8_lossy(bytes).into_owned(),
        metadata: DocumentMetadata::default(),
    }
}
