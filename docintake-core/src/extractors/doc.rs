//! Legacy Word (97-2003) text recovery.
//!
//! The binary format stores body text in the `WordDocument` stream of an OLE
//! compound file, either as UTF-16LE or as 8-bit characters depending on the
//! piece table. Only that stream is read; font tables, styles and summary
//! information live in other streams and stay out of the text. Rather than
//! walking the piece table we recover printable runs in both encodings and
//! keep whichever decoding yields more text. Word's paragraph (`\r`) and cell
//! (`\x07`) marks become line breaks, which is what the request form
//! reconstructor needs.

use super::{ExtractOptions, ExtractionSource, Extractor};
use crate::types::{DocumentMetadata, Extraction};
use anyhow::{bail, Context, Result};
use std::io::{Cursor, Read};

const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const WORD_DOCUMENT_STREAM: &str = "/WordDocument";

/// Runs shorter than this are treated as binary noise.
const MIN_RUN_CHARS: usize = 4;

pub struct LegacyDocExtractor;

impl Extractor for LegacyDocExtractor {
    fn extract(&self, source: &ExtractionSource<'_>, _options: &ExtractOptions) -> Result<Extraction> {
        if !source.bytes.starts_with(&OLE_SIGNATURE) {
            bail!("not an OLE compound document (legacy .doc signature missing)");
        }

        let stream = word_document_stream(source.bytes)?;
        let wide = utf16_runs(&stream);
        let narrow = byte_runs(&stream);
        let text = if wide.chars().count() >= narrow.chars().count() {
            wide
        } else {
            narrow
        };

        if text.trim().is_empty() {
            bail!("no recoverable text found in legacy word document");
        }

        Ok(Extraction {
            text,
            tables: Vec::new(),
            metadata: DocumentMetadata {
                extractor: Some(self.name().to_string()),
                ..Default::default()
            },
        })
    }

    fn name(&self) -> &str {
        "doc-legacy"
    }
}

fn word_document_stream(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut compound =
        cfb::CompoundFile::open(Cursor::new(bytes)).context("malformed OLE compound document")?;
    if !compound.is_stream(WORD_DOCUMENT_STREAM) {
        bail!("no WordDocument stream; not a word document");
    }
    let mut stream = compound
        .open_stream(WORD_DOCUMENT_STREAM)
        .context("failed to open WordDocument stream")?;
    let mut content = Vec::new();
    stream
        .read_to_end(&mut content)
        .context("failed to read WordDocument stream")?;
    Ok(content)
}

fn is_break(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\u{7}' | '\u{b}' | '\u{c}')
}

fn is_text_char(c: char) -> bool {
    c == '\t' || (!c.is_control() && c != '\u{fffd}')
}

/// Accumulates characters into lines, dropping runs that are too short.
#[derive(Default)]
struct RunCollector {
    out: String,
    run: String,
    run_chars: usize,
}

impl RunCollector {
    fn push(&mut self, c: char) {
        if is_break(c) {
            self.run.push('\n');
        } else if is_text_char(c) {
            self.run.push(c);
            self.run_chars += 1;
        } else {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.run_chars >= MIN_RUN_CHARS {
            self.out.push_str(&self.run);
            if !self.run.ends_with('\n') {
                self.out.push('\n');
            }
        }
        self.run.clear();
        self.run_chars = 0;
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

fn utf16_runs(bytes: &[u8]) -> String {
    let mut collector = RunCollector::default();
    let units = bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    for decoded in char::decode_utf16(units) {
        match decoded {
            // Restrict to Latin/Latin-1 and general punctuation to avoid reading
            // arbitrary binary as CJK text
            Ok(c) if (c as u32) < 0x0250 || ('\u{2000}'..='\u{206f}').contains(&c) => collector.push(c),
            _ => collector.flush(),
        }
    }
    collector.finish()
}

fn byte_runs(bytes: &[u8]) -> String {
    let mut collector = RunCollector::default();
    for &b in bytes {
        if b.is_ascii() {
            collector.push(b as char);
        } else {
            collector.flush();
        }
    }
    collector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    /// Compound file holding the given streams.
    fn compound(streams: &[(&str, &[u8])]) -> Vec<u8> {
        let mut file = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        for (name, payload) in streams {
            let mut stream = file.create_stream(name).unwrap();
            stream.write_all(payload).unwrap();
            stream.flush().unwrap();
        }
        file.flush().unwrap();
        file.into_inner().into_inner()
    }

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    fn extract(bytes: &[u8]) -> Result<Extraction> {
        let source = ExtractionSource {
            path: Path::new("form.doc"),
            bytes,
        };
        LegacyDocExtractor.extract(&source, &ExtractOptions::default())
    }

    #[test]
    fn recovers_utf16_paragraphs() {
        let body = utf16("Order Number\r001-1699\rSite\u{7}Angel\r");
        let text = extract(&compound(&[(WORD_DOCUMENT_STREAM, &body)])).unwrap().text;
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["Order Number", "001-1699", "Site", "Angel"]);
    }

    #[test]
    fn recovers_8bit_text() {
        let bytes = compound(&[(WORD_DOCUMENT_STREAM, b"Project\rPA install\r")]);
        let text = extract(&bytes).unwrap().text;
        assert!(text.contains("Project\nPA install"));
    }

    #[test]
    fn other_streams_stay_out_of_the_text() {
        let fonts = utf16("Times New Roman\0Symbol\0Arial\0");
        let body = utf16("Project\rPA install\r");
        let bytes = compound(&[
            ("/1Table", &fonts),
            ("/\u{5}SummaryInformation", b"Normal.dotm Microsoft Office Word"),
            (WORD_DOCUMENT_STREAM, &body),
        ]);
        let text = extract(&bytes).unwrap().text;
        assert!(text.contains("PA install"));
        assert!(!text.contains("Times New Roman"));
        assert!(!text.contains("Normal.dotm"));
    }

    #[test]
    fn rejects_files_without_ole_signature() {
        let err = extract(b"PK\x03\x04 definitely a zip").unwrap_err();
        assert!(err.to_string().contains("OLE"));
    }

    #[test]
    fn rejects_compound_files_without_word_stream() {
        let bytes = compound(&[("/Workbook", b"spreadsheet data here")]);
        let err = extract(&bytes).unwrap_err();
        assert!(err.to_string().contains("WordDocument"));
    }

    #[test]
    fn rejects_documents_without_text() {
        assert!(extract(&compound(&[(WORD_DOCUMENT_STREAM, &[0u8; 64])])).is_err());
    }
}
