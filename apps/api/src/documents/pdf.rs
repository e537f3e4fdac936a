//! PDF extraction. Text comes from `pdf-extract`; page count and the document-info
//! dictionary are read with `lopdf`.

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use lopdf::{Dictionary, Document, Object};

use crate::documents::{DocumentFormat, DocumentMetadata, ExtractError, ParsedDocument};

pub fn extract_pdf(bytes: &[u8]) -> Result<ParsedDocument, ExtractError> {
    let document = Document::load_mem(bytes).map_err(|e| failed(e.to_string()))?;
    let metadata = read_metadata(&document);

    // pdf-extract panics on some malformed inputs instead of returning an error
    let content = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }))
    .map_err(|payload| failed(panic_message(payload.as_ref())))?
    .map_err(|e| failed(e.to_string()))?;

    Ok(ParsedDocument { content, metadata })
}

fn failed(cause: String) -> ExtractError {
    ExtractError::ExtractionFailed {
        format: DocumentFormat::Pdf,
        cause,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "PDF decoder panicked".to_string())
}

fn read_metadata(document: &Document) -> DocumentMetadata {
    let mut metadata = DocumentMetadata {
        pages: Some(document.get_pages().len() as u32),
        ..Default::default()
    };

    let Some(info) = info_dictionary(document) else {
        return metadata;
    };

    metadata.title = info_string(document, info, b"Title");
    metadata.author = info_string(document, info, b"Author");
    metadata.subject = info_string(document, info, b"Subject");
    metadata.creator = info_string(document, info, b"Creator");
    metadata.producer = info_string(document, info, b"Producer");
    metadata.creation_date =
        info_string(document, info, b"CreationDate").and_then(|s| parse_pdf_date(&s));
    metadata.modification_date =
        info_string(document, info, b"ModDate").and_then(|s| parse_pdf_date(&s));

    metadata
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let info = document.trailer.get(b"Info").ok()?;
    resolve(document, info)?.as_dict().ok()
}

fn info_string(document: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
    match resolve(document, info.get(key).ok()?)? {
        Object::String(bytes, _) => decode_text_string(bytes),
        _ => None,
    }
}

/// PDF text strings are UTF-16BE when they carry a byte-order mark, UTF-8 with the
/// PDF 2.0 marker, and PDFDocEncoding otherwise (treated as Latin-1).
fn decode_text_string(bytes: &[u8]) -> Option<String> {
    let decoded = if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        bytes.iter().map(|&b| b as char).collect()
    };

    let trimmed = decoded.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses `D:YYYYMMDDHHmmSSOHH'mm'`. Everything after the year is optional; a missing
/// offset means UTC. Returns `None` for anything that does not fit the pattern.
fn parse_pdf_date(raw: &str) -> Option<DateTime<Utc>> {
    const DEFAULTS: &str = "00000101000000";

    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);
    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, zone) = s.split_at(digits_end);

    if digits.len() < 4 || digits.len() > DEFAULTS.len() || digits.len() % 2 != 0 {
        return None;
    }

    let padded = format!("{digits}{}", &DEFAULTS[digits.len()..]);
    let naive = NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").ok()?;
    let offset = parse_pdf_offset(zone)?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_pdf_offset(zone: &str) -> Option<FixedOffset> {
    let sign = match zone.chars().next() {
        None | Some('Z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };

    let mut parts = zone[1..].split('\'').filter(|p| !p.is_empty());
    let hours: i32 = parts.next()?.parse().ok()?;
    let minutes: i32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
