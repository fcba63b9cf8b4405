//! In-memory wide table mirroring the score sheet.

use serde_json::{Map, Value};
use tracing::warn;

/// Header row plus string cells, every row padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ScoreTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build from raw sheet values: first row is the header.
    ///
    /// Short rows are padded with empty cells (the sheet omits trailing
    /// blanks); cells beyond the header width are dropped.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();
        let Some(columns) = iter.next() else {
            return Self::default();
        };
        let width = columns.len();

        let rows = iter
            .enumerate()
            .map(|(i, mut row)| {
                if row.len() > width {
                    warn!(row = i + 2, cells = row.len(), width, "dropping cells beyond header");
                    row.truncate(width);
                }
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// Build from JSON records (objects keyed by column name), as produced by
    /// [`ScoreTable::to_records`]. Columns appear in first-seen order.
    pub fn from_records(records: &[Map<String, Value>]) -> Self {
        let mut table = Self::default();
        for record in records {
            for name in record.keys() {
                table.ensure_column(name, "");
            }
            let row = table.push_empty_row();
            for (name, value) in record {
                table.set(row, name, value_to_cell(value));
            }
        }
        table
    }

    /// A table is loaded once it has a header row.
    pub fn is_loaded(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with exactly this header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Add `name` with `default` in every row unless it already exists.
    pub fn ensure_column(&mut self, name: &str, default: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(default.to_string());
        }
        self.columns.len() - 1
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Set a cell, creating the column (empty elsewhere) if needed.
    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) {
        let idx = self.ensure_column(column, "");
        if let Some(r) = self.rows.get_mut(row) {
            r[idx] = value.into();
        }
    }

    /// Append a row of empty cells and return its index.
    pub fn push_empty_row(&mut self) -> usize {
        self.rows.push(vec![String::new(); self.columns.len()]);
        self.rows.len() - 1
    }

    pub fn clear_rows(&mut self) {
        self.rows.clear();
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_values_pads_short_rows() {
        let table = ScoreTable::from_values(values(&[&["A", "B", "C"], &["1"], &["1", "2", "3"]]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
        assert_eq!(table.get(1, "C"), Some("3"));
    }

    #[test]
    fn test_from_values_truncates_long_rows() {
        let table = ScoreTable::from_values(values(&[&["A"], &["1", "extra"]]));
        assert_eq!(table.rows()[0], vec!["1"]);
    }

    #[test]
    fn test_from_values_empty_is_unloaded() {
        let table = ScoreTable::from_values(Vec::new());
        assert!(!table.is_loaded());
        assert!(table.is_empty());
    }

    #[test]
    fn test_header_only_is_loaded() {
        let table = ScoreTable::from_values(values(&[&["Lớp", "Tuần"]]));
        assert!(table.is_loaded());
        assert!(table.is_empty());
    }

    #[test]
    fn test_ensure_column_fills_default() {
        let mut table = ScoreTable::from_values(values(&[&["A"], &["x"], &["y"]]));
        let idx = table.ensure_column("B", "0");
        assert_eq!(idx, 1);
        assert_eq!(table.get(0, "B"), Some("0"));
        assert_eq!(table.get(1, "B"), Some("0"));
        // Existing column is untouched
        assert_eq!(table.ensure_column("A", "z"), 0);
        assert_eq!(table.get(0, "A"), Some("x"));
    }

    #[test]
    fn test_set_creates_missing_column() {
        let mut table = ScoreTable::new(vec!["A".to_string()]);
        let row = table.push_empty_row();
        table.set(row, "New", "5");
        assert_eq!(table.columns(), &["A".to_string(), "New".to_string()]);
        assert_eq!(table.get(row, "New"), Some("5"));
        assert_eq!(table.get(row, "A"), Some(""));
    }

    #[test]
    fn test_duplicate_headers_first_wins() {
        let table = ScoreTable::from_values(values(&[&["A", "A"], &["first", "second"]]));
        assert_eq!(table.get(0, "A"), Some("first"));
    }

    #[test]
    fn test_records_round_trip() {
        let table = ScoreTable::from_values(values(&[&["Lớp", "Tuần"], &["10A1", "9"]]));
        let records = table.to_records();
        assert_eq!(records[0].get("Lớp"), Some(&json!("10A1")));

        let rebuilt = ScoreTable::from_records(&records);
        assert_eq!(rebuilt.get(0, "Lớp"), Some("10A1"));
        assert_eq!(rebuilt.get(0, "Tuần"), Some("9"));
    }

    #[test]
    fn test_from_records_converts_non_string_values() {
        let record = json!({"Tuần": 9, "Đi trễ": null, "Lớp": "10A2"});
        let records = vec![record.as_object().unwrap().clone()];
        let table = ScoreTable::from_records(&records);
        assert_eq!(table.get(0, "Tuần"), Some("9"));
        assert_eq!(table.get(0, "Đi trễ"), Some(""));
        assert_eq!(table.get(0, "Lớp"), Some("10A2"));
    }
}
