//! Word documents. DOCX is a zip package whose body lives in `word/document.xml`;
//! legacy `.doc` uploads go down the same path and only succeed when they are really
//! OOXML packages under an old extension.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::documents::{DocumentFormat, DocumentMetadata, ExtractError, ParsedDocument};

const DOCUMENT_PART: &str = "word/document.xml";
/// Uncompressed ceiling for the body part.
const MAX_DOCUMENT_PART_BYTES: u64 = 64 * 1024 * 1024;

pub fn extract_docx(bytes: &[u8]) -> Result<ParsedDocument, ExtractError> {
    let content = read_word_body(bytes).map_err(|cause| ExtractError::ExtractionFailed {
        format: DocumentFormat::Docx,
        cause,
    })?;

    Ok(ParsedDocument {
        content,
        metadata: DocumentMetadata::default(),
    })
}

pub fn extract_legacy_doc(bytes: &[u8]) -> Result<ParsedDocument, ExtractError> {
    let content =
        read_word_body(bytes).map_err(|cause| ExtractError::LegacyDocUnsupported { cause })?;

    Ok(ParsedDocument {
        content,
        metadata: DocumentMetadata::default(),
    })
}

fn read_word_body(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| format!("not a Word package: {e}"))?;

    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("missing {DOCUMENT_PART}: {e}"))?;

    if part.size() > MAX_DOCUMENT_PART_BYTES {
        return Err(format!(
            "{DOCUMENT_PART} is {} bytes uncompressed, limit is {MAX_DOCUMENT_PART_BYTES}",
            part.size()
        ));
    }

    let mut xml = String::new();
    part.take(MAX_DOCUMENT_PART_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {DOCUMENT_PART}: {e}"))?;

    raw_text_from_document_xml(&xml)
}

/// Flattens WordprocessingML into raw text. Each paragraph is followed by a blank line,
/// tabs and line breaks inside runs are kept.
fn raw_text_from_document_xml(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => out.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if in_run => out.push('\t'),
                b"br" | b"cr" if in_run => out.push('\n'),
                b"p" => out.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("bad text at byte {}: {e}", reader.buffer_position()))?;
                out.push_str(&text);
            }
            Ok(Event::CData(t)) if in_text => {
                out.push_str(&String::from_utf8_lossy(&t));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn build_package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer
                .start_file(*name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_paragraphs_and_runs_are_joined() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>John </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>Doe</w:t></w:r></w:p><w:p><w:r><w:t>Software Engineer</w:t></w:r></w:p>"#,
        );
        let bytes = build_package(&[("word/document.xml", &xml)]);

        let parsed = extract_docx(&bytes).unwrap();
        assert_eq!(parsed.content, "John Doe\n\nSoftware Engineer\n\n");
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_tabs_breaks_and_entities_inside_runs() {
        let xml = wrap_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Skills:</w:t><w:tab/><w:t>C &amp; Rust</w:t><w:br/><w:t>Go</w:t></w:r></w:p>"#,
        );
        let bytes = build_package(&[("word/document.xml", &xml)]);

        let parsed = extract_docx(&bytes).unwrap();
        assert_eq!(parsed.content, "Skills:\tC & Rust\nGo\n\n");
    }

    #[test]
    fn test_empty_paragraph_still_separates() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>A</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>B</w:t></w:r></w:p>"#);
        let bytes = build_package(&[("word/document.xml", &xml)]);

        assert_eq!(extract_docx(&bytes).unwrap().content, "A\n\n\n\nB\n\n");
    }

    #[test]
    fn test_package_without_body_part_fails() {
        let bytes = build_package(&[("docProps/core.xml", "<cp:coreProperties/>")]);
        let err = extract_docx(&bytes).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_legacy_doc_accepts_ooxml_payload() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>Renamed docx</w:t></w:r></w:p>"#);
        let bytes = build_package(&[("word/document.xml", &xml)]);

        let parsed = extract_legacy_doc(&bytes).unwrap();
        assert_eq!(parsed.content, "Renamed docx\n\n");
    }

    #[test]
    fn test_legacy_doc_failure_is_distinct_from_docx_failure() {
        let err = extract_legacy_doc(b"garbage").unwrap_err();
        assert!(matches!(err, ExtractError::LegacyDocUnsupported { .. }));

        let err = extract_docx(b"garbage").unwrap_err();
        assert!(matches!(err, ExtractError::ExtractionFailed { .. }));
    }
}
