//! XLSX / XLS extraction via calamine.
//!
//! Each worksheet becomes one table: the first non-empty row names the
//! columns, every following row is a data row. The text rendering lists each
//! sheet under a `Sheet: <name>` line with tab-separated cells so the
//! document still has a searchable body.

use super::{ExtractOptions, ExtractionSource, Extractor};
use crate::types::{DocumentMetadata, Extraction, Table, TableRow};
use anyhow::{anyhow, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::{Number, Value};
use std::io::Cursor;

pub struct SpreadsheetExtractor;

impl Extractor for SpreadsheetExtractor {
    fn extract(&self, source: &ExtractionSource<'_>, options: &ExtractOptions) -> Result<Extraction> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(source.bytes))
            .map_err(|e| anyhow!("failed to open workbook {}: {e}", source.path.display()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut tables = Vec::with_capacity(sheet_names.len());
        let mut text = String::new();

        for name in &sheet_names {
            let range = workbook
                .worksheet_range(name)
                .map_err(|e| anyhow!("failed to read sheet {name}: {e}"))?;

            text.push_str(&sheet_text(name, &range));
            tables.push(sheet_to_table(name, &range, options.table_sample_rows));
        }

        Ok(Extraction {
            text,
            tables,
            metadata: DocumentMetadata {
                extractor: Some(self.name().to_string()),
                sheet_names,
                ..Default::default()
            },
        })
    }

    fn name(&self) -> &str {
        "spreadsheet"
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 9.0e15 {
                Value::from(*f as i64)
            } else {
                Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
            }
        }
        other => Value::String(other.to_string()),
    }
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Column keys for a header row. Blank cells become `Column N`; repeated
/// names get a numeric suffix (`Qty`, `Qty 2`) so no column is overwritten.
fn column_names(header: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (index, cell) in header.iter().enumerate() {
        let base = match cell.to_string().trim() {
            "" => format!("Column {}", index + 1),
            name => name.to_string(),
        };
        let mut name = base.clone();
        let mut occurrence = 1;
        while names.contains(&name) {
            occurrence += 1;
            name = format!("{base} {occurrence}");
        }
        names.push(name);
    }
    names
}

/// One table per sheet: first non-blank row is the header, `total_rows`
/// counts all non-blank data rows, `sample_rows` keeps at most `sample_limit`.
pub fn sheet_to_table(name: &str, range: &Range<Data>, sample_limit: usize) -> Table {
    let mut rows = range.rows().filter(|row| !is_blank_row(row));

    let Some(header) = rows.next() else {
        return Table::sampled(name, Vec::new(), sample_limit);
    };
    let columns = column_names(header);

    let data: Vec<TableRow> = rows
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let value = row.get(index).map(cell_to_value).unwrap_or(Value::Null);
                    (column.clone(), value)
                })
                .collect()
        })
        .collect();

    Table::sampled(name, data, sample_limit)
}

fn sheet_text(name: &str, range: &Range<Data>) -> String {
    let mut text = format!("Sheet: {name}\n");
    for row in range.rows().filter(|row| !is_blank_row(row)) {
        let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        text.push_str(cells.join("\t").trim_end());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(rows: &[&[Data]]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn samples_rows_but_counts_all() {
        let sheet = range(&[
            &[s("Item"), s("Qty")],
            &[s("Conduit"), Data::Float(8.0)],
            &[s("Boxes"), Data::Float(5.0)],
            &[s("Couplers"), Data::Float(10.0)],
            &[s("Saddles"), Data::Float(40.0)],
            &[s("Glands"), Data::Float(2.5)],
        ]);
        let table = sheet_to_table("Materials", &sheet, 2);
        assert_eq!(table.name, "Materials");
        assert_eq!(table.total_rows, 5);
        assert_eq!(table.sample_rows.len(), 2);
        assert_eq!(table.sample_rows[0]["Item"], "Conduit");
        assert_eq!(table.sample_rows[0]["Qty"], 8);
    }

    #[test]
    fn blank_headers_get_positional_names() {
        let sheet = range(&[&[s("Item"), Data::Empty], &[s("Lugs"), Data::Int(12)]]);
        let table = sheet_to_table("Sheet1", &sheet, 10);
        let columns: Vec<&str> = table.sample_rows[0].keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["Item", "Column 2"]);
        assert_eq!(table.sample_rows[0]["Column 2"], 12);
    }

    #[test]
    fn repeated_headers_keep_every_column() {
        let sheet = range(&[
            &[s("Item"), s("Qty"), s("Qty"), s("Qty")],
            &[s("Lugs"), Data::Int(12), Data::Int(4), Data::Int(1)],
        ]);
        let table = sheet_to_table("Returns", &sheet, 10);
        let row = &table.sample_rows[0];
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["Item", "Qty", "Qty 2", "Qty 3"]);
        assert_eq!(row["Qty"], 12);
        assert_eq!(row["Qty 2"], 4);
        assert_eq!(row["Qty 3"], 1);
    }

    #[test]
    fn empty_sheet_has_no_rows() {
        let sheet: Range<Data> = Range::empty();
        let table = sheet_to_table("Blank", &sheet, 5);
        assert_eq!(table.total_rows, 0);
        assert!(table.sample_rows.is_empty());
    }

    #[test]
    fn sheet_text_is_tab_separated() {
        let sheet = range(&[&[s("Item"), s("Qty")], &[s("Lugs"), Data::Int(12)]]);
        assert_eq!(sheet_text("Stock", &sheet), "Sheet: Stock\nItem\tQty\nLugs\t12\n");
    }
}
