use super::lines::{label_key, Vocabulary};
use crate::types::{Table, TableRow};
use serde_json::Value;

pub const HEADER_TABLE_NAME: &str = "Request Header";

/// Build the single-row "Request Header" table, or `None` when no header
/// field has a value.
pub fn extract_header(lines: &[String], vocab: &Vocabulary) -> Option<Table> {
    let mut row = TableRow::new();
    let mut resolved = 0usize;

    for (name, aliases) in &vocab.header_fields {
        let value = find_field_value(lines, aliases, vocab).unwrap_or_default();
        if !value.is_empty() {
            resolved += 1;
        }
        row.insert(name.clone(), Value::String(value));
    }

    (resolved > 0).then(|| Table::from_rows(HEADER_TABLE_NAME, vec![row]))
}

/// Value carried by the first line labelled with one of `aliases`.
///
/// Only that first labelled line is consulted; later lines starting with the
/// same label are usually item text, not header fields.
fn find_field_value(lines: &[String], aliases: &[String], vocab: &Vocabulary) -> Option<String> {
    let index = lines.iter().position(|line| {
        let key = label_key(line);
        aliases.iter().any(|alias| key.starts_with(alias.as_str()))
    })?;
    value_for_label(lines, index, aliases, vocab).filter(|value| !value.is_empty())
}

fn value_for_label(
    lines: &[String],
    index: usize,
    aliases: &[String],
    vocab: &Vocabulary,
) -> Option<String> {
    let line = &lines[index];

    // "Label: value"
    if let Some((_, value)) = line.split_once(':') {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    // "Label" alone, value on the next line unless that line is another label
    let key = label_key(line);
    if aliases.iter().any(|alias| *alias == key) {
        let next = lines.get(index + 1)?;
        if !vocab.is_header_label(next) {
            return Some(next.clone());
        }
    }

    None
}
