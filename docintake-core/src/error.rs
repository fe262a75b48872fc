use crate::types::IngestWarning;
use thiserror::Error;

/// Fatal outcomes of an ingestion call.
///
/// Per-document problems never show up here; they are collected as
/// `IngestWarning`s. Only a batch that is empty up front, or one where every
/// entry was skipped, fails the whole call.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("ingest request must include at least one document")]
    EmptyInput,

    #[error("no readable documents were provided ({} warning(s))", warnings.len())]
    NoReadableDocuments { warnings: Vec<IngestWarning> },
}

impl IngestError {
    /// Warnings accumulated before the batch was abandoned, if any.
    pub fn warnings(&self) -> &[IngestWarning] {
        match self {
            IngestError::EmptyInput => &[],
            IngestError::NoReadableDocuments { warnings } => warnings,
        }
    }
}
