//! Request form table reconstruction
//!
//! Recovers up to two tables from the flat text of a word-processor
//! document laid out as a stores request form:
//!
//! - "Request Header": one row of labelled fields (order number, project, ...)
//! - "Request Items": the numbered material list
//!
//! This is a heuristic over one known layout family. It never fails; text
//! without recognizable structure simply yields no tables.

pub mod header;
pub mod items;
pub mod lines;

use crate::config::ReconstructorConfig;
use crate::types::Table;

pub use header::HEADER_TABLE_NAME;
pub use items::{ItemRow, ITEMS_TABLE_NAME};
pub use lines::{normalize_lines, Vocabulary};

/// Reconstructs request form tables using a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct TableReconstructor {
    vocabulary: Vocabulary,
}

impl Default for TableReconstructor {
    fn default() -> Self {
        Self::new(&ReconstructorConfig::default())
    }
}

impl TableReconstructor {
    pub fn new(config: &ReconstructorConfig) -> Self {
        Self {
            vocabulary: Vocabulary::from_config(config),
        }
    }

    /// Header table (if any) followed by items table (if any).
    pub fn reconstruct(&self, text: &str) -> Vec<Table> {
        let lines = normalize_lines(text);
        if lines.is_empty() {
            return Vec::new();
        }

        let header = header::extract_header(&lines, &self.vocabulary);
        let items = items::extract_items(&lines, &self.vocabulary);

        tracing::debug!(
            lines = lines.len(),
            header = header.is_some(),
            item_rows = items.as_ref().map(|t| t.total_rows).unwrap_or(0),
            "request form reconstruction"
        );

        header.into_iter().chain(items).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORDER_FORM: &str = "Order Number\n001-1699\nOrder Requested by\nAhmed Shaik\n\
        Project\nPA install\nDate Required\n16/04/25\nSite\nAngel\nStores use Only\nNo.\n\
        Material/Plant Description\nQuantity Required\n1\n25mm conduits\n8\n2\n\
        25mm conduit besa boxes and fixings\n5\n3\n25mm couplers and nipples\n10\n\
        Signed by\nStoreman\n";

    #[test]
    fn order_form_yields_header_and_items() {
        let tables = TableReconstructor::default().reconstruct(ORDER_FORM);
        assert_eq!(tables.len(), 2);

        let header = &tables[0];
        assert_eq!(header.name, "Request Header");
        assert_eq!(header.total_rows, 1);
        assert_eq!(header.sample_rows[0]["Order Number"], "001-1699");
        assert_eq!(header.sample_rows[0]["Order Requested by"], "Ahmed Shaik");
        assert_eq!(header.sample_rows[0]["Project"], "PA install");
        assert_eq!(header.sample_rows[0]["Site"], "Angel");
        assert_eq!(header.sample_rows[0]["Date Required"], "16/04/25");
        assert_eq!(header.sample_rows[0]["Date Ordered"], "");

        let items = &tables[1];
        assert_eq!(items.name, "Request Items");
        assert_eq!(items.total_rows, 3);
        assert_eq!(items.sample_rows.len(), 3);
        assert_eq!(
            serde_json::to_value(&items.sample_rows[0]).unwrap(),
            json!({"No.": 1, "Material/Plant Description": "25mm conduits", "Quantity Required": "8"})
        );
        assert_eq!(
            serde_json::to_value(&items.sample_rows[2]).unwrap(),
            json!({"No.": 3, "Material/Plant Description": "25mm couplers and nipples", "Quantity Required": "10"})
        );
    }

    #[test]
    fn unstructured_text_yields_nothing() {
        let tables = TableReconstructor::default().reconstruct("Random note\nNo structured request here.");
        assert!(tables.is_empty());
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(TableReconstructor::default().reconstruct(" \n\t\n").is_empty());
    }

    #[test]
    fn items_without_header() {
        let text = "Quantity Required\n1\nCable tray\n6\n";
        let tables = TableReconstructor::default().reconstruct(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, ITEMS_TABLE_NAME);
    }

    #[test]
    fn alternate_layout_vocabulary() {
        let config = ReconstructorConfig {
            window_start_markers: vec!["Parts list".to_string()],
            end_markers: vec!["Approved".to_string()],
            ..Default::default()
        };
        let text = "Parts list\n1\nBearing\n2\nApproved\n2\nShaft\n1\n";
        let tables = TableReconstructor::new(&config).reconstruct(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].total_rows, 1);
        assert_eq!(tables[0].sample_rows[0]["Material/Plant Description"], "Bearing");
    }
}
