use crate::config::ReconstructorConfig;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static ROW_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?").unwrap());

static NUMERIC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?\d+(?:\.\d+)?$").unwrap());

/// Split text into trimmed, whitespace-collapsed, non-empty lines.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| WHITESPACE_RUN.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Case-folded, alphanumeric-only form used for label comparison.
pub fn label_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn is_digits(line: &str) -> bool {
    ROW_NUMBER.is_match(line)
}

/// Whole line is a single (optionally signed) decimal.
pub fn is_numeric(line: &str) -> bool {
    NUMERIC_LINE.is_match(line)
}

/// First embedded decimal in `line`, as written.
pub fn numeric_token(line: &str) -> Option<&str> {
    NUMERIC_TOKEN.find(line).map(|m| m.as_str())
}

/// Immutable lookup tables derived from a `ReconstructorConfig`.
///
/// Labels are stored as `label_key` forms so every comparison is
/// case- and punctuation-insensitive.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub(crate) header_fields: Vec<(String, Vec<String>)>,
    noise_labels: HashSet<String>,
    noise_prefixes: Vec<String>,
    window_start_markers: Vec<String>,
    column_heading_markers: Vec<String>,
    end_markers: Vec<String>,
    pub(crate) max_row_number: u32,
    pub(crate) max_rows: usize,
}

fn keys(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|label| label_key(label))
        .filter(|key| !key.is_empty())
        .collect()
}

impl Vocabulary {
    pub fn from_config(config: &ReconstructorConfig) -> Self {
        Self {
            header_fields: config
                .header_fields
                .iter()
                .map(|field| (field.name.clone(), keys(&field.aliases)))
                .collect(),
            noise_labels: keys(&config.noise_labels).into_iter().collect(),
            noise_prefixes: config
                .noise_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            window_start_markers: keys(&config.window_start_markers),
            column_heading_markers: keys(&config.column_heading_markers),
            end_markers: keys(&config.end_markers),
            max_row_number: config.max_row_number,
            max_rows: config.max_rows,
        }
    }

    /// Boilerplate: a known label, bare punctuation, or a noise prefix.
    pub fn is_noise(&self, line: &str) -> bool {
        let key = label_key(line);
        if key.is_empty() || self.noise_labels.contains(&key) {
            return true;
        }
        let lowered = line.to_lowercase();
        self.noise_prefixes
            .iter()
            .any(|prefix| lowered.starts_with(prefix.as_str()))
    }

    /// True when the line is, or begins with `label:`, one of the header labels.
    pub fn is_header_label(&self, line: &str) -> bool {
        let key = label_key(line);
        let before_colon = line.split_once(':').map(|(label, _)| label_key(label));
        self.header_fields.iter().any(|(_, aliases)| {
            aliases
                .iter()
                .any(|alias| *alias == key || before_colon.as_deref() == Some(alias.as_str()))
        })
    }

    /// Parse a row-number line: digits only, within `1..=max_row_number`.
    pub fn row_number(&self, line: &str) -> Option<u32> {
        if !is_digits(line) {
            return None;
        }
        line.parse::<u32>()
            .ok()
            .filter(|n| (1..=self.max_row_number).contains(n))
    }

    /// Half-open `[start, end)` range of lines holding the item list.
    pub fn item_window(&self, lines: &[String]) -> (usize, usize) {
        let line_keys: Vec<String> = lines.iter().map(|l| label_key(l)).collect();

        let start = line_keys
            .iter()
            .position(|key| self.window_start_markers.iter().any(|m| key.contains(m.as_str())))
            .or_else(|| {
                line_keys
                    .iter()
                    .position(|key| self.column_heading_markers.iter().any(|m| key == m))
            })
            .map(|index| index + 1)
            .unwrap_or(0);

        let end = line_keys
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, key)| self.end_markers.iter().any(|m| key.starts_with(m.as_str())))
            .map(|(index, _)| index)
            .unwrap_or(lines.len());

        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_config(&ReconstructorConfig::default())
    }

    #[test]
    fn normalizes_whitespace_and_drops_blank_lines() {
        let lines = normalize_lines("  Order   Number \r\n\n\t\n 001-1699\n");
        assert_eq!(lines, vec!["Order Number", "001-1699"]);
    }

    #[test]
    fn label_key_strips_punctuation() {
        assert_eq!(label_key("Material/Plant Description"), "materialplantdescription");
        assert_eq!(label_key("No."), "no");
        assert_eq!(label_key("----"), "");
    }

    #[test]
    fn numeric_token_keeps_original_text() {
        assert_eq!(numeric_token("approx 12.5 m"), Some("12.5"));
        assert_eq!(numeric_token("-3 returned"), Some("-3"));
        assert_eq!(numeric_token("ten"), None);
    }

    #[test]
    fn noise_lines() {
        let vocab = vocabulary();
        assert!(vocab.is_noise("No."));
        assert!(vocab.is_noise("Material/Plant Description"));
        assert!(vocab.is_noise("| --- |"));
        assert!(vocab.is_noise("Quantity Issued today"));
        assert!(vocab.is_noise("Order form v2"));
        assert!(!vocab.is_noise("25mm conduits"));
        assert!(!vocab.is_noise("8"));
    }

    #[test]
    fn row_number_bounds() {
        let vocab = vocabulary();
        assert_eq!(vocab.row_number("1"), Some(1));
        assert_eq!(vocab.row_number("500"), Some(500));
        assert_eq!(vocab.row_number("0"), None);
        assert_eq!(vocab.row_number("501"), None);
        assert_eq!(vocab.row_number("1a"), None);
        assert_eq!(vocab.row_number("99999999999999999999"), None);
    }

    #[test]
    fn window_prefers_stores_marker_then_column_heading() {
        let vocab = vocabulary();
        let lines: Vec<String> = ["Quantity Required", "1", "Stores use Only", "2", "Storeman", "3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(vocab.item_window(&lines), (3, 4));

        let lines: Vec<String> = ["Intro", "Quantity Required", "1", "x"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(vocab.item_window(&lines), (2, 4));

        let lines: Vec<String> = ["1", "x", "2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(vocab.item_window(&lines), (0, 3));
    }

    #[test]
    fn header_label_detection() {
        let vocab = vocabulary();
        assert!(vocab.is_header_label("Project"));
        assert!(vocab.is_header_label("Site:"));
        assert!(vocab.is_header_label("Date Required: 16/04/25"));
        assert!(!vocab.is_header_label("PA install"));
    }
}
