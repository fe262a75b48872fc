//! Item-row scanning for request forms.
//!
//! The scan is a three-phase state machine over the item window:
//!
//! ```text
//! SeekRowNumber ──(row number)──> SeekDescription ──(description)──> SeekQuantity
//!      ^                                 │                                │
//!      └──────(no/invalid description)───┘                                │
//!      └──────(row emitted, cursor past quantity)─────────────────────────┤
//!      └──────(no quantity: rewind to just past the description)──────────┘
//! ```
//!
//! Every transition either moves the cursor forward or returns to
//! `SeekRowNumber`, which always moves it forward, so the scan terminates.

use super::lines::{is_numeric, numeric_token, Vocabulary};
use crate::types::{Table, TableRow};
use serde_json::Value;

pub const ITEMS_TABLE_NAME: &str = "Request Items";
pub const COLUMN_NUMBER: &str = "No.";
pub const COLUMN_DESCRIPTION: &str = "Material/Plant Description";
pub const COLUMN_QUANTITY: &str = "Quantity Required";

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub number: u32,
    pub description: String,
    /// Quantity exactly as matched in the source line
    pub quantity: String,
}

impl ItemRow {
    fn into_table_row(self) -> TableRow {
        let mut row = TableRow::new();
        row.insert(COLUMN_NUMBER.to_string(), Value::from(self.number));
        row.insert(COLUMN_DESCRIPTION.to_string(), Value::String(self.description));
        row.insert(COLUMN_QUANTITY.to_string(), Value::String(self.quantity));
        row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    SeekRowNumber,
    SeekDescription { number: u32 },
    SeekQuantity { number: u32, description: usize },
}

#[derive(Debug, PartialEq)]
enum Transition {
    /// Enter `phase` with the cursor at the given line.
    Goto(ScanPhase, usize),
    /// Emit a row and resume seeking row numbers at the given line.
    Emit(ItemRow, usize),
    /// Window exhausted.
    Finish,
}

struct ItemScanner<'a> {
    lines: &'a [String],
    end: usize,
    vocab: &'a Vocabulary,
}

impl<'a> ItemScanner<'a> {
    /// Index of the first non-noise line at or after `from`, inside the window.
    fn next_content(&self, from: usize) -> Option<usize> {
        (from..self.end).find(|&index| !self.vocab.is_noise(&self.lines[index]))
    }

    fn step(&self, phase: ScanPhase, cursor: usize) -> Transition {
        match phase {
            ScanPhase::SeekRowNumber => {
                if cursor >= self.end {
                    return Transition::Finish;
                }
                match self.vocab.row_number(&self.lines[cursor]) {
                    Some(number) => Transition::Goto(ScanPhase::SeekDescription { number }, cursor + 1),
                    None => Transition::Goto(ScanPhase::SeekRowNumber, cursor + 1),
                }
            }
            ScanPhase::SeekDescription { number } => match self.next_content(cursor) {
                None => Transition::Finish,
                Some(index) if is_numeric(&self.lines[index]) => {
                    // Rejected candidate; the numeric line itself is re-examined
                    Transition::Goto(ScanPhase::SeekRowNumber, cursor)
                }
                Some(index) => Transition::Goto(
                    ScanPhase::SeekQuantity {
                        number,
                        description: index,
                    },
                    index + 1,
                ),
            },
            ScanPhase::SeekQuantity {
                number,
                description,
            } => {
                let quantity = self
                    .next_content(cursor)
                    .and_then(|index| numeric_token(&self.lines[index]).map(|token| (index, token)));
                match quantity {
                    Some((index, token)) => Transition::Emit(
                        ItemRow {
                            number,
                            description: self.lines[description].clone(),
                            quantity: token.to_string(),
                        },
                        index + 1,
                    ),
                    None => Transition::Goto(ScanPhase::SeekRowNumber, description + 1),
                }
            }
        }
    }
}

/// Scan `lines[start..end]` for numbered item rows.
pub fn scan_items(lines: &[String], start: usize, end: usize, vocab: &Vocabulary) -> Vec<ItemRow> {
    let scanner = ItemScanner {
        lines,
        end: end.min(lines.len()),
        vocab,
    };
    let mut rows = Vec::new();
    let mut phase = ScanPhase::SeekRowNumber;
    let mut cursor = start;

    while rows.len() < vocab.max_rows {
        match scanner.step(phase, cursor) {
            Transition::Goto(next_phase, next_cursor) => {
                phase = next_phase;
                cursor = next_cursor;
            }
            Transition::Emit(row, next_cursor) => {
                rows.push(row);
                phase = ScanPhase::SeekRowNumber;
                cursor = next_cursor;
            }
            Transition::Finish => break,
        }
    }

    rows
}

/// Build the "Request Items" table, or `None` when no rows were found.
pub fn extract_items(lines: &[String], vocab: &Vocabulary) -> Option<Table> {
    let (start, end) = vocab.item_window(lines);
    let rows = scan_items(lines, start, end, vocab);
    if rows.is_empty() {
        return None;
    }
    let rows = rows.into_iter().map(ItemRow::into_table_row).collect();
    Some(Table::from_rows(ITEMS_TABLE_NAME, rows))
}
