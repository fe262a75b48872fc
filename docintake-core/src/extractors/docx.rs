//! DOCX text extraction
//!
//! Reads `word/document.xml` out of the zip package and flattens it to text:
//! one line per paragraph (table cells included), `<w:tab/>` as a tab and
//! `<w:br/>` as a line break. Package properties supply title, author,
//! timestamps and page count when present.

use super::{ExtractOptions, ExtractionSource, Extractor};
use crate::types::{DocumentMetadata, Extraction};
use anyhow::{anyhow, Context, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const CORE_PROPERTIES_PART: &str = "docProps/core.xml";
const APP_PROPERTIES_PART: &str = "docProps/app.xml";

pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    fn extract(&self, source: &ExtractionSource<'_>, _options: &ExtractOptions) -> Result<Extraction> {
        let mut archive =
            ZipArchive::new(Cursor::new(source.bytes)).context("not a zip package")?;

        let document_xml = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| anyhow!("missing {DOCUMENT_PART}; not a word document"))?;
        let text = document_xml_to_text(&document_xml)?;

        let mut metadata = DocumentMetadata {
            extractor: Some(self.name().to_string()),
            ..Default::default()
        };
        // Properties are optional; a malformed part is ignored rather than failing the document
        if let Ok(Some(core)) = read_part(&mut archive, CORE_PROPERTIES_PART) {
            if let Ok(fields) = element_texts(&core, &["title", "creator", "created", "modified"]) {
                metadata.title = fields.get("title").cloned();
                metadata.author = fields.get("creator").cloned();
                metadata.created = fields.get("created").cloned();
                metadata.modified = fields.get("modified").cloned();
            }
        }
        if let Ok(Some(app)) = read_part(&mut archive, APP_PROPERTIES_PART) {
            if let Ok(fields) = element_texts(&app, &["Pages"]) {
                metadata.page_count = fields.get("Pages").and_then(|p| p.parse().ok());
            }
        }

        Ok(Extraction {
            text,
            tables: Vec::new(),
            metadata,
        })
    }

    fn name(&self) -> &str {
        "docx"
    }
}

fn read_part<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("failed to open {name}")),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("failed to read {name}"))?;
    Ok(Some(content))
}

/// Flatten WordprocessingML body XML to plain text.
pub fn document_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::with_capacity(xml.len() / 4);
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| anyhow!("bad text at byte {}: {e}", reader.buffer_position()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "malformed document XML at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }

    Ok(text)
}

/// Text content of the first element with each requested local name.
fn element_texts(xml: &str, names: &[&str]) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut found = HashMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                current = names.contains(&local.as_str()).then_some(local);
            }
            Ok(Event::Text(t)) => {
                if let Some(name) = current.take() {
                    let value = t.unescape()?.trim().to_string();
                    if !value.is_empty() {
                        found.entry(name).or_insert(value);
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("malformed properties XML: {e}")),
            _ => {}
        }
    }

    Ok(found)
}
