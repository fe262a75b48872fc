//! Checksums, filesystem stats and text summaries for ingested documents.

use crate::types::{DocumentStats, DocumentSummary, DocumentTag, Table};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::Metadata;

/// Appended to a preview that was cut short.
pub const TRUNCATION_MARKER: char = '…';

/// SHA-256 of arbitrary bytes, lowercase hex.
pub fn calculate_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Checksum over the canonical bytes of a document: the original file for
/// binary formats, the UTF-8 encoded extracted text for plain text.
pub fn document_checksum(tag: DocumentTag, file_bytes: &[u8], text: &str) -> String {
    if tag.is_binary() {
        calculate_checksum(file_bytes)
    } else {
        calculate_checksum(text.as_bytes())
    }
}

pub fn collect_stats(metadata: &Metadata) -> DocumentStats {
    DocumentStats {
        size: metadata.len(),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        // Not every filesystem records a birth time
        created: metadata.created().ok().map(DateTime::<Utc>::from),
    }
}

/// First `limit` characters of `text`, with a marker appended only when
/// something was cut.
pub fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => {
            let mut preview = String::with_capacity(byte_index + TRUNCATION_MARKER.len_utf8());
            preview.push_str(&text[..byte_index]);
            preview.push(TRUNCATION_MARKER);
            preview
        }
        None => text.to_string(),
    }
}

pub fn summarize(text: &str, tables: &[Table], preview_limit: usize) -> DocumentSummary {
    DocumentSummary {
        char_count: text.chars().count(),
        word_count: text.split_whitespace().count(),
        table_count: tables.len(),
        preview: truncate_preview(text, preview_limit),
    }
}
