//! Format classification for uploaded documents.
//!
//! The declared MIME type wins when it is one of the known types; otherwise the
//! lower-cased text after the filename's last `.` decides. Anything else is rejected.

use std::fmt;

use serde::Serialize;

use crate::documents::ExtractError;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_TXT: &str = "text/plain";
pub const MIME_MD: &str = "text/markdown";

/// Every format the extractor can decode. Order is the advertised order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Txt,
    Md,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 5] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Doc,
        DocumentFormat::Txt,
        DocumentFormat::Md,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Md => "md",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => MIME_PDF,
            DocumentFormat::Docx => MIME_DOCX,
            DocumentFormat::Doc => MIME_DOC,
            DocumentFormat::Txt => MIME_TXT,
            DocumentFormat::Md => MIME_MD,
        }
    }

    /// Exact match only: parameters such as `; charset=utf-8` do not match.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.mime_type() == mime)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Classifies a document from its declared MIME type, falling back to its filename.
    pub fn classify(filename: &str, declared_mime: &str) -> Result<Self, ExtractError> {
        if let Some(format) = Self::from_mime_type(declared_mime) {
            return Ok(format);
        }

        let extension = file_extension(filename);
        extension
            .and_then(Self::from_extension)
            .ok_or_else(|| ExtractError::UnsupportedFormat {
                filename: filename.to_string(),
                mime_type: declared_mime.to_string(),
            })
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Text after the last `.`, or `None` when the name has no dot at all.
fn file_extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

pub fn is_supported(filename: &str, declared_mime: &str) -> bool {
    DocumentFormat::classify(filename, declared_mime).is_ok()
}

pub fn supported_extensions() -> Vec<&'static str> {
    DocumentFormat::ALL.iter().map(|f| f.extension()).collect()
}

pub fn supported_mime_types() -> Vec<&'static str> {
    DocumentFormat::ALL.iter().map(|f| f.mime_type()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_extension_classifies_to_its_format() {
        for format in DocumentFormat::ALL {
            let name = format!("resume.{}", format.extension());
            assert!(is_supported(&name, ""), "{name} should be supported");
            assert_eq!(DocumentFormat::classify(&name, "").unwrap(), format);
        }
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::classify("CV.PDF", "application/octet-stream").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::classify("Notes.Md", "").unwrap(),
            DocumentFormat::Md
        );
    }

    #[test]
    fn test_mime_type_takes_precedence_over_extension() {
        let format = DocumentFormat::classify("resume.pdf", "text/plain").unwrap();
        assert_eq!(format, DocumentFormat::Txt);
    }

    #[test]
    fn test_every_known_mime_type_classifies_without_extension() {
        for format in DocumentFormat::ALL {
            assert_eq!(
                DocumentFormat::classify("upload", format.mime_type()).unwrap(),
                format
            );
        }
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = DocumentFormat::classify("resume.rtf", "application/rtf").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat { .. }));
        assert!(!is_supported("resume.rtf", "application/rtf"));
    }

    #[test]
    fn test_missing_extension_with_unknown_mime_is_unsupported() {
        assert!(!is_supported("resume", ""));
        assert!(!is_supported("resume", "application/octet-stream"));
    }

    #[test]
    fn test_only_last_extension_counts() {
        assert_eq!(
            DocumentFormat::classify("resume.pdf.txt", "").unwrap(),
            DocumentFormat::Txt
        );
        assert!(!is_supported("resume.docx.bak", ""));
    }

    #[test]
    fn test_mime_with_parameters_falls_back_to_extension() {
        assert!(!is_supported("resume", "text/plain; charset=utf-8"));
        assert_eq!(
            DocumentFormat::classify("resume.md", "text/plain; charset=utf-8").unwrap(),
            DocumentFormat::Md
        );
    }

    #[test]
    fn test_supported_lists_are_ordered() {
        assert_eq!(supported_extensions(), vec!["pdf", "docx", "doc", "txt", "md"]);
        assert_eq!(
            supported_mime_types(),
            vec![
                "application/pdf",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/msword",
                "text/plain",
                "text/markdown",
            ]
        );
    }
}
