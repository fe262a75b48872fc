//! Format extractors
//!
//! This module provides the extraction layer that turns a file of a given
//! format tag into plain text plus any tables the format carries natively.
//!
//! ## Architecture
//!
//! ```text
//! Document bytes + path
//!     ↓
//! [ExtractorRegistry: tag → Extractor]
//!     ↓
//! Extraction { text, tables, metadata }
//!     ↓
//! [Orchestrator: reconstruction, checksum, summary]
//! ```
//!
//! ## Available Extractors
//!
//! - `TextExtractor` - plain text, markdown, logs
//! - `DocxExtractor` - Office Open XML word documents
//! - `LegacyDocExtractor` - Word 97-2003 binary documents (best effort)
//! - `PdfExtractor` - PDF via pdf-extract (feature `pdf-backend`)
//! - `SpreadsheetExtractor` - XLSX/XLS via calamine (feature `spreadsheet-backend`)

pub mod doc;
pub mod docx;
#[cfg(feature = "pdf-backend")]
pub mod pdf;
#[cfg(feature = "spreadsheet-backend")]
pub mod spreadsheet;
pub mod text;

use crate::types::{DocumentTag, Extraction};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

pub use doc::LegacyDocExtractor;
pub use docx::DocxExtractor;
#[cfg(feature = "pdf-backend")]
pub use pdf::PdfExtractor;
#[cfg(feature = "spreadsheet-backend")]
pub use spreadsheet::SpreadsheetExtractor;
pub use text::TextExtractor;

/// The file being extracted. Extractors may use either the path or the
/// already-read bytes.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionSource<'a> {
    pub path: &'a Path,
    pub bytes: &'a [u8],
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Row cap for tables the format produces natively (at least 1)
    pub table_sample_rows: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            table_sample_rows: 25,
        }
    }
}

/// One format extraction capability.
///
/// Failures are returned as errors and become per-document warnings; they
/// never abort a batch.
pub trait Extractor: Send + Sync {
    /// Extract text, native tables and metadata
    fn extract(&self, source: &ExtractionSource<'_>, options: &ExtractOptions) -> Result<Extraction>;

    /// Extractor name for logging and document metadata
    fn name(&self) -> &str;
}

/// Capability registry mapping each format tag to its extractor.
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentTag, Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Register (or replace) the extractor for `tag`.
    pub fn register<E>(&mut self, tag: DocumentTag, extractor: E) -> &mut Self
    where
        E: Extractor + 'static,
    {
        self.extractors.insert(tag, Box::new(extractor));
        self
    }

    pub fn get(&self, tag: DocumentTag) -> Option<&dyn Extractor> {
        self.extractors.get(&tag).map(|e| e.as_ref())
    }

    pub fn supports(&self, tag: DocumentTag) -> bool {
        self.extractors.contains_key(&tag)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(DocumentTag::Text, TextExtractor)
            .register(DocumentTag::Docx, DocxExtractor)
            .register(DocumentTag::Doc, LegacyDocExtractor);
        #[cfg(feature = "pdf-backend")]
        registry.register(DocumentTag::Pdf, PdfExtractor);
        #[cfg(feature = "spreadsheet-backend")]
        registry.register(DocumentTag::Spreadsheet, SpreadsheetExtractor);
        registry
    }
}
