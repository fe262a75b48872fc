use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::extractors::{ExtractOptions, ExtractionSource, ExtractorRegistry};
use crate::reconstruction::TableReconstructor;
use crate::resolver::{display_path, resolve_path, resolve_tag};
use crate::summary::{collect_stats, document_checksum, summarize};
use crate::types::*;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Instant;

/// Batch ingestion pipeline: resolve, read, extract, reconstruct, summarize.
///
/// Documents are processed strictly in order, one at a time. Every
/// descriptor produces exactly one outcome, either a `Document` or an
/// `IngestWarning`.
pub struct DocumentIngestor {
    config: IngestConfig,
    registry: ExtractorRegistry,
    reconstructor: TableReconstructor,
}

impl Default for DocumentIngestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl DocumentIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self::with_registry(config, ExtractorRegistry::default())
    }

    /// Create an ingestor with a caller-supplied extractor registry
    pub fn with_registry(config: IngestConfig, registry: ExtractorRegistry) -> Self {
        let reconstructor = TableReconstructor::new(&config.reconstructor);
        Self {
            config,
            registry,
            reconstructor,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Mutable access for registering extra or replacement extractors
    pub fn registry_mut(&mut self) -> &mut ExtractorRegistry {
        &mut self.registry
    }

    /// Ingest typed descriptors.
    pub fn ingest(&self, descriptors: &[DocumentDescriptor]) -> Result<IngestResult, IngestError> {
        if descriptors.is_empty() {
            return Err(IngestError::EmptyInput);
        }
        self.run(descriptors.iter().map(|d| Ok(d.clone())))
    }

    /// Ingest an arbitrary JSON request.
    ///
    /// The request must be a non-empty array. Each entry is either a path
    /// string or an object with a string `path` and optional `label` and
    /// `type`; anything else becomes a warning and is skipped.
    pub fn ingest_json(&self, request: &Value) -> Result<IngestResult, IngestError> {
        let entries = match request.as_array() {
            Some(entries) if !entries.is_empty() => entries,
            _ => return Err(IngestError::EmptyInput),
        };
        self.run(entries.iter().map(descriptor_from_json))
    }

    fn run<I>(&self, entries: I) -> Result<IngestResult, IngestError>
    where
        I: Iterator<Item = Result<DocumentDescriptor, IngestWarning>>,
    {
        let start = Instant::now();
        let mut documents = Vec::new();
        let mut warnings = Vec::new();

        for entry in entries {
            let outcome = entry.and_then(|descriptor| self.ingest_one(&descriptor));
            match outcome {
                Ok(document) => documents.push(document),
                Err(warning) => {
                    tracing::warn!(reason = %warning.message, detail = %warning.detail, "document skipped");
                    warnings.push(warning);
                }
            }
        }

        tracing::info!(
            documents = documents.len(),
            warnings = warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ingestion finished"
        );

        if documents.is_empty() {
            return Err(IngestError::NoReadableDocuments { warnings });
        }
        Ok(IngestResult {
            documents,
            warnings,
        })
    }

    fn ingest_one(&self, descriptor: &DocumentDescriptor) -> Result<Document, IngestWarning> {
        if descriptor.path().trim().is_empty() {
            return Err(IngestWarning::new(
                "Document entry is missing a path",
                serde_json::to_value(descriptor).unwrap_or(Value::Null),
            ));
        }

        let path = resolve_path(descriptor.path(), self.config.workspace_root.as_deref());
        let shown = display_path(&path);
        tracing::debug!(path = %shown, "resolved descriptor");

        let fs_metadata = std::fs::metadata(&path)
            .map_err(|e| IngestWarning::new(format!("Unable to access {shown}"), e.to_string()))?;
        if fs_metadata.is_dir() {
            return Err(IngestWarning::new(
                format!("Unable to access {shown}"),
                "path is a directory",
            ));
        }

        // Unsupported files are rejected before any bytes are read
        let tag = resolve_tag(descriptor.type_hint(), &path).ok_or_else(|| {
            IngestWarning::new(
                format!("Unsupported file type for {shown}"),
                json!({
                    "path": shown,
                    "type": descriptor.type_hint(),
                }),
            )
        })?;

        let bytes = std::fs::read(&path)
            .map_err(|e| IngestWarning::new(format!("Unable to access {shown}"), e.to_string()))?;
        tracing::debug!(path = %shown, tag = %tag, size = bytes.len(), "read document");

        let (extractor_name, extraction) = self.extract(tag, &path, &bytes).map_err(|e| {
            IngestWarning::new(format!("Failed to parse {shown}"), format!("{e:#}"))
        })?;

        let Extraction {
            text,
            mut tables,
            metadata: extracted,
        } = extraction;

        let sample_limit = self.config.effective_sample_rows();
        for table in &mut tables {
            table.sample_rows.truncate(sample_limit);
        }

        if tag.is_word_family() {
            tables.extend(self.reconstructor.reconstruct(&text));
        }

        let checksum = document_checksum(tag, &bytes, &text);
        drop(bytes);

        let summary = summarize(&text, &tables, self.config.preview_limit);
        // Extractors that report nothing still get attributed
        let mut metadata = DocumentMetadata {
            extractor: Some(extractor_name),
            ..Default::default()
        };
        metadata.merge_extracted(extracted);

        tracing::debug!(
            path = %shown,
            chars = summary.char_count,
            tables = summary.table_count,
            "document ingested"
        );

        Ok(Document {
            path: shown,
            label: descriptor
                .label()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            tag,
            text,
            tables,
            checksum,
            stats: collect_stats(&fs_metadata),
            summary,
            metadata: Some(metadata),
        })
    }

    fn extract(&self, tag: DocumentTag, path: &Path, bytes: &[u8]) -> anyhow::Result<(String, Extraction)> {
        let extractor = self
            .registry
            .get(tag)
            .ok_or_else(|| anyhow::anyhow!("no extractor registered for type '{tag}'"))?;

        let options = ExtractOptions {
            table_sample_rows: self.config.effective_sample_rows(),
        };
        let source = ExtractionSource { path, bytes };
        tracing::debug!(extractor = extractor.name(), path = %path.display(), "extracting");
        let extraction = extractor.extract(&source, &options)?;
        Ok((extractor.name().to_string(), extraction))
    }
}

/// Shape-check one JSON request entry.
fn descriptor_from_json(entry: &Value) -> Result<DocumentDescriptor, IngestWarning> {
    match entry {
        Value::String(path) => Ok(DocumentDescriptor::Path(path.clone())),
        Value::Object(fields) => {
            let path = fields
                .get("path")
                .and_then(Value::as_str)
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| IngestWarning::new("Document entry is missing a path", entry.clone()))?;
            Ok(DocumentDescriptor::Entry {
                path: path.to_string(),
                label: fields.get("label").and_then(Value::as_str).map(str::to_string),
                type_hint: fields.get("type").and_then(Value::as_str).map(str::to_string),
            })
        }
        other => Err(IngestWarning::new(
            "Document entry must be a path string or an object",
            other.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::capture_events;

    #[test]
    fn non_array_request_is_empty_input() {
        let ingestor = DocumentIngestor::default();
        for request in [json!(null), json!({"path": "a.txt"}), json!("a.txt"), json!([])] {
            assert!(matches!(ingestor.ingest_json(&request), Err(IngestError::EmptyInput)));
        }
        assert!(matches!(ingestor.ingest(&[]), Err(IngestError::EmptyInput)));
    }

    #[test]
    fn json_entry_shapes() {
        assert_eq!(
            descriptor_from_json(&json!("forms/a.docx")).unwrap(),
            DocumentDescriptor::new("forms/a.docx")
        );

        let entry = descriptor_from_json(&json!({"path": "a.bin", "label": "Scan", "type": "pdf"})).unwrap();
        assert_eq!(entry.path(), "a.bin");
        assert_eq!(entry.label(), Some("Scan"));
        assert_eq!(entry.type_hint(), Some("pdf"));

        let blank = descriptor_from_json(&json!({"path": "   "})).unwrap_err();
        assert_eq!(blank.message, "Document entry is missing a path");
        assert_eq!(blank.detail, json!({"path": "   "}));

        let numeric = descriptor_from_json(&json!(42)).unwrap_err();
        assert_eq!(numeric.detail, json!(42));
    }

    #[test]
    fn malformed_entries_only_is_no_readable_documents() {
        let ingestor = DocumentIngestor::default();
        let err = ingestor.ingest_json(&json!([7, {"label": "x"}, ""])).unwrap_err();
        assert!(matches!(err, IngestError::NoReadableDocuments { .. }));
        assert_eq!(err.warnings().len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn unsupported_type_is_rejected_without_reading() {
        let dir = std::env::temp_dir().join("docintake_processor_unsupported_fifo");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let fifo = dir.join("stream.iso");
        // Reading a FIFO with no writer blocks, so this only returns if the bytes are never read
        let made = std::process::Command::new("mkfifo").arg(&fifo).status();
        if !matches!(made, Ok(status) if status.success()) {
            return;
        }

        let err = DocumentIngestor::default()
            .ingest(&[DocumentDescriptor::new(fifo.to_string_lossy())])
            .unwrap_err();
        assert!(err.warnings()[0].message.starts_with("Unsupported file type for"));
    }

    #[test]
    fn skipped_entries_log_the_reason_field() {
        let ingestor = DocumentIngestor::default();
        let events = capture_events(|| {
            let _ = ingestor.ingest_json(&json!([17]));
        });

        let skipped = events
            .iter()
            .find(|e| e.message == "document skipped")
            .expect("skip event");
        assert_eq!(skipped.level, tracing::Level::WARN);
        assert!(skipped.field_names.iter().any(|f| f == "reason"));
        assert_eq!(skipped.field_names.iter().filter(|f| *f == "message").count(), 1);
    }

    #[test]
    fn unregistered_tag_is_a_parse_warning() {
        let dir = std::env::temp_dir().join("docintake_processor_unregistered");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("note.txt");
        std::fs::write(&file, "hello").unwrap();

        let ingestor = DocumentIngestor::with_registry(IngestConfig::default(), ExtractorRegistry::empty());
        let err = ingestor
            .ingest(&[DocumentDescriptor::new(file.to_string_lossy())])
            .unwrap_err();
        let warning = &err.warnings()[0];
        assert!(warning.message.starts_with("Failed to parse"));
        assert!(warning.detail.as_str().unwrap().contains("no extractor registered"));
    }
}
