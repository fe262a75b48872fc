// Docintake Core Library
//
// Batch document ingestion with pluggable format extractors.
// Turns a list of file descriptors into uniform documents (text, tables,
// checksum, stats, summary) plus per-entry warnings.

pub mod types;
pub mod error;
pub mod config;
pub mod resolver;
pub mod extractors;
pub mod reconstruction;
pub mod summary;
pub mod processor;

#[cfg(test)]
mod test_support;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::IngestError;
pub use config::{IngestConfig, ReconstructorConfig};
pub use extractors::{ExtractOptions, ExtractionSource, Extractor, ExtractorRegistry};
pub use reconstruction::TableReconstructor;
pub use processor::DocumentIngestor;
pub use resolver::WORKSPACE_ROOT_ENV;
