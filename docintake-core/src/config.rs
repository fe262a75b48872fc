use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Default value functions for serde
fn default_preview_limit() -> usize {
    6000
}

fn default_table_sample_rows() -> usize {
    25
}

fn default_max_row_number() -> u32 {
    500
}

fn default_max_rows() -> usize {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum preview length in characters (a truncation marker is appended past this)
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
    /// Rows kept per extractor-produced table (clamped to at least 1)
    #[serde(default = "default_table_sample_rows")]
    pub table_sample_rows: usize,
    /// Root for relative descriptor paths. Falls back to DOCINTAKE_WORKSPACE_ROOT,
    /// then the current directory.
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
    /// Request form reconstruction vocabulary
    #[serde(default)]
    pub reconstructor: ReconstructorConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            preview_limit: default_preview_limit(),
            table_sample_rows: default_table_sample_rows(),
            workspace_root: None,
            reconstructor: ReconstructorConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: IngestConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => match Self::load_from_file(p) {
                Ok(config) => {
                    tracing::info!(path = p, "loaded config");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = p, error = %e, "failed to load config, using defaults");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn effective_sample_rows(&self) -> usize {
        self.table_sample_rows.max(1)
    }
}

/// A canonical header field and the labels it may appear under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderFieldConfig {
    /// Column name used in the emitted header row
    pub name: String,
    /// Accepted label spellings; compared case-folded with non-alphanumerics removed
    pub aliases: Vec<String>,
}

impl HeaderFieldConfig {
    fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

fn default_header_fields() -> Vec<HeaderFieldConfig> {
    vec![
        HeaderFieldConfig::new("Order Number", &["Order Number", "Order No"]),
        HeaderFieldConfig::new("Order Requested by", &["Order Requested by", "Requested by"]),
        HeaderFieldConfig::new("Project", &["Project", "Project Name"]),
        HeaderFieldConfig::new("Site", &["Site", "Site Location"]),
        HeaderFieldConfig::new("Date Ordered", &["Date Ordered", "Order Date"]),
        HeaderFieldConfig::new("Date Required", &["Date Required", "Required Date", "Required by"]),
    ]
}

fn default_noise_labels() -> Vec<String> {
    [
        "No.",
        "No",
        "Number",
        "Item",
        "Item No",
        "Material/Plant Description",
        "Material Description",
        "Plant Description",
        "Description",
        "Material",
        "Quantity",
        "Quantity Required",
        "Quantity Issued",
        "Quantity Returned",
        "Qty",
        "Unit",
        "Units",
        "Remarks",
        "Comments",
        "Stores use Only",
        "Office use Only",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_noise_prefixes() -> Vec<String> {
    vec!["quantity ".to_string(), "order ".to_string()]
}

fn default_window_start_markers() -> Vec<String> {
    vec!["Stores use Only".to_string()]
}

fn default_column_heading_markers() -> Vec<String> {
    vec!["Quantity Required".to_string()]
}

fn default_end_markers() -> Vec<String> {
    vec![
        "Signed by".to_string(),
        "Issued by".to_string(),
        "Received by".to_string(),
        "Returned by".to_string(),
        "Storeman".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructorConfig {
    /// Header fields in output column order
    #[serde(default = "default_header_fields")]
    pub header_fields: Vec<HeaderFieldConfig>,
    /// Boilerplate labels skipped while hunting for descriptions and quantities
    #[serde(default = "default_noise_labels")]
    pub noise_labels: Vec<String>,
    /// Lowercase line prefixes treated as noise
    #[serde(default = "default_noise_prefixes")]
    pub noise_prefixes: Vec<String>,
    /// Lines containing one of these open the item window (scan starts after them)
    #[serde(default = "default_window_start_markers")]
    pub window_start_markers: Vec<String>,
    /// Exact column headings used as a fallback window start
    #[serde(default = "default_column_heading_markers")]
    pub column_heading_markers: Vec<String>,
    /// Lines starting with one of these close the item window
    #[serde(default = "default_end_markers")]
    pub end_markers: Vec<String>,
    /// Largest value accepted as a row number
    #[serde(default = "default_max_row_number")]
    pub max_row_number: u32,
    /// Stop collecting item rows after this many
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ReconstructorConfig {
    fn default() -> Self {
        Self {
            header_fields: default_header_fields(),
            noise_labels: default_noise_labels(),
            noise_prefixes: default_noise_prefixes(),
            window_start_markers: default_window_start_markers(),
            column_heading_markers: default_column_heading_markers(),
            end_markers: default_end_markers(),
            max_row_number: default_max_row_number(),
            max_rows: default_max_rows(),
        }
    }
}
