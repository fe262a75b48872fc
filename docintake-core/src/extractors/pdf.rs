use super::{ExtractOptions, ExtractionSource, Extractor};
use crate::types::{DocumentMetadata, Extraction};
use anyhow::{anyhow, Result};

/// PDF text via pdf-extract; page count via lopdf.
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn extract(&self, source: &ExtractionSource<'_>, _options: &ExtractOptions) -> Result<Extraction> {
        // pdf-extract can panic on malformed input
        let bytes = source.bytes;
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
            .map_err(|_| anyhow!("pdf text extraction panicked on malformed input"))?
            .map_err(|e| anyhow!("pdf text extraction failed: {e}"))?;

        // A page count is nice to have; text is what matters
        let page_count = match lopdf::Document::load_mem(source.bytes) {
            Ok(document) => u32::try_from(document.get_pages().len()).ok(),
            Err(e) => {
                tracing::debug!(path = %source.path.display(), error = %e, "pdf page count unavailable");
                None
            }
        };

        Ok(Extraction {
            text,
            tables: Vec::new(),
            metadata: DocumentMetadata {
                extractor: Some(self.name().to_string()),
                page_count,
                ..Default::default()
            },
        })
    }

    fn name(&self) -> &str {
        "pdf"
    }
}
