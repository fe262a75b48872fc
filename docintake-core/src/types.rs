use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ===== FORMAT TAGS =====

/// Supported document format identifiers.
///
/// Every `Document` carries exactly one of these; entries that cannot be
/// mapped to a tag are rejected before a `Document` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentTag {
    Text,
    Pdf,
    Docx,
    Doc,
    Spreadsheet,
}

impl DocumentTag {
    pub const ALL: [DocumentTag; 5] = [
        DocumentTag::Text,
        DocumentTag::Pdf,
        DocumentTag::Docx,
        DocumentTag::Doc,
        DocumentTag::Spreadsheet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentTag::Text => "text",
            DocumentTag::Pdf => "pdf",
            DocumentTag::Docx => "docx",
            DocumentTag::Doc => "doc",
            DocumentTag::Spreadsheet => "spreadsheet",
        }
    }

    /// Word-processor formats whose extracted text goes through the
    /// request form reconstructor.
    pub fn is_word_family(self) -> bool {
        matches!(self, DocumentTag::Docx | DocumentTag::Doc)
    }

    /// Binary formats are checksummed over the file bytes; plain text over
    /// the UTF-8 encoding of the extracted text.
    pub fn is_binary(self) -> bool {
        !matches!(self, DocumentTag::Text)
    }
}

impl fmt::Display for DocumentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== INPUT =====

/// Caller-supplied reference to one input document.
///
/// Deserializes from either a bare path string or `{path, label?, type?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentDescriptor {
    Path(String),
    Entry {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        type_hint: Option<String>,
    },
}

impl DocumentDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        DocumentDescriptor::Path(path.into())
    }

    pub fn with_label(path: impl Into<String>, label: impl Into<String>) -> Self {
        DocumentDescriptor::Entry {
            path: path.into(),
            label: Some(label.into()),
            type_hint: None,
        }
    }

    pub fn with_type(path: impl Into<String>, type_hint: impl Into<String>) -> Self {
        DocumentDescriptor::Entry {
            path: path.into(),
            label: None,
            type_hint: Some(type_hint.into()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            DocumentDescriptor::Path(path) => path,
            DocumentDescriptor::Entry { path, .. } => path,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            DocumentDescriptor::Path(_) => None,
            DocumentDescriptor::Entry { label, .. } => label.as_deref(),
        }
    }

    pub fn type_hint(&self) -> Option<&str> {
        match self {
            DocumentDescriptor::Path(_) => None,
            DocumentDescriptor::Entry { type_hint, .. } => type_hint.as_deref(),
        }
    }
}

impl From<&str> for DocumentDescriptor {
    fn from(path: &str) -> Self {
        DocumentDescriptor::Path(path.to_string())
    }
}

impl From<String> for DocumentDescriptor {
    fn from(path: String) -> Self {
        DocumentDescriptor::Path(path)
    }
}

// ===== TABLES =====

/// One sampled row: column name → scalar value, in column order.
pub type TableRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub total_rows: usize,
    pub sample_rows: Vec<TableRow>,
}

impl Table {
    /// Table whose sample is the complete row set.
    pub fn from_rows(name: impl Into<String>, rows: Vec<TableRow>) -> Self {
        Self {
            name: name.into(),
            total_rows: rows.len(),
            sample_rows: rows,
        }
    }

    /// Table keeping at most `sample_limit` rows (never fewer than one)
    /// while `total_rows` still reports the full count.
    pub fn sampled(name: impl Into<String>, mut rows: Vec<TableRow>, sample_limit: usize) -> Self {
        let total_rows = rows.len();
        rows.truncate(sample_limit.max(1));
        Self {
            name: name.into(),
            total_rows,
            sample_rows: rows,
        }
    }
}

// ===== EXTRACTION OUTPUT =====

/// Metadata surfaced by an extractor. All fields optional; merged into the
/// final document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheet_names: Vec<String>,
}

impl DocumentMetadata {
    /// Merge extracted metadata on top of current values.
    /// Present fields from `extracted` overwrite; absent fields preserve existing.
    pub fn merge_extracted(&mut self, extracted: DocumentMetadata) {
        if extracted.extractor.is_some() { self.extractor = extracted.extractor; }
        if extracted.page_count.is_some() { self.page_count = extracted.page_count; }
        if extracted.title.is_some() { self.title = extracted.title; }
        if extracted.author.is_some() { self.author = extracted.author; }
        if extracted.created.is_some() { self.created = extracted.created; }
        if extracted.modified.is_some() { self.modified = extracted.modified; }
        if !extracted.sheet_names.is_empty() { self.sheet_names = extracted.sheet_names; }
    }
}

/// What a format extractor hands back to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub text: String,
    pub tables: Vec<Table>,
    pub metadata: DocumentMetadata,
}

impl Extraction {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

// ===== OUTPUT =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub char_count: usize,
    pub word_count: usize,
    pub table_count: usize,
    pub preview: String,
}

/// A successfully ingested document. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub tag: DocumentTag,
    pub text: String,
    pub tables: Vec<Table>,
    pub checksum: String,
    pub stats: DocumentStats,
    pub summary: DocumentSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

/// A non-fatal problem with one descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestWarning {
    pub message: String,
    pub detail: Value,
}

impl IngestWarning {
    pub fn new(message: impl Into<String>, detail: impl Into<Value>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    pub documents: Vec<Document>,
    pub warnings: Vec<IngestWarning>,
}
