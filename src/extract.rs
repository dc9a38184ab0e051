// src/extract.rs
//! Plain-text extraction from uploaded CV files.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Upper bound on the decompressed `word/document.xml`.
const DOCX_XML_MAX_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported CV format: {0}")]
    UnsupportedFormat(String),
    #[error("could not extract text: {0}")]
    ExtractionFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CvFormat {
    Pdf,
    Docx,
    LegacyDoc,
    Text,
}

fn detect_format(filename: &str, content_type: Option<&str>) -> CvFormat {
    let name = filename.to_ascii_lowercase();
    let ct = content_type.unwrap_or_default().to_ascii_lowercase();
    if name.ends_with(".pdf") || ct == "application/pdf" {
        CvFormat::Pdf
    } else if name.ends_with(".docx") || ct.contains("wordprocessingml") {
        CvFormat::Docx
    } else if name.ends_with(".doc") || ct == "application/msword" {
        CvFormat::LegacyDoc
    } else {
        CvFormat::Text
    }
}

/// UTF-8 first; any invalid sequence means the bytes are read as Latin-1.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Paragraph text of a DOCX body: `w:t` runs joined, one line per `w:p`.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let failed = |what: &str, e: &dyn std::fmt::Display| {
        ExtractError::ExtractionFailed(format!("{what}: {e}"))
    };

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| failed("not a DOCX archive", &e))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| failed("word/document.xml", &e))?
        .take(DOCX_XML_MAX_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| failed("word/document.xml", &e))?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                let text = t.unescape().map_err(|e| failed("document text", &e))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(failed("malformed document.xml", &e)),
            _ => {}
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}

/// Extract trimmed text from a PDF, DOCX or plain-text upload.
pub fn extract_text(
    bytes: &[u8],
    filename: &str,
    content_type: Option<&str>,
) -> Result<String, ExtractError> {
    let text = match detect_format(filename, content_type) {
        CvFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::ExtractionFailed(e.to_string()))?,
        CvFormat::Docx => docx_text(bytes)?,
        CvFormat::LegacyDoc => {
            return Err(ExtractError::UnsupportedFormat(
                "legacy .doc files are not supported, upload PDF, DOCX or plain text".into(),
            ))
        }
        CvFormat::Text => decode_text(bytes),
    };
    Ok(text.trim().to_string())
}
