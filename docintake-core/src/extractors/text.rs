use super::{ExtractOptions, ExtractionSource, Extractor};
use crate::types::{DocumentMetadata, Extraction};
use anyhow::Result;

/// Plain text: decode as UTF-8 (invalid sequences replaced) and return as-is.
pub struct TextExtractor;

impl Extractor for TextExtractor {
    fn extract(&self, source: &ExtractionSource<'_>, _options: &ExtractOptions) -> Result<Extraction> {
        let decoded = String::from_utf8_lossy(source.bytes);
        let text = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded).to_string();

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
        "text"
    }
}
