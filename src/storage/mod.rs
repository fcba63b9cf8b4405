//! Storage layer for the weekly score CLI
//!
//! Every table is read whole and written whole: clear, then write rows in
//! batches. Two backends implement [`TableStore`]:
//! - `sheets`: Google Sheets values API (the system of record)
//! - `sqlite`: a local cell store for offline use and tests

pub mod sheets;
pub mod sqlite;


use serde::Serialize;
use std::fmt;

use crate::Result;

pub use sheets::SheetsStore;
pub use sqlite::SqliteStore;

/// A cell as written to the store: rubric counts and totals go out as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n)
    }
}

/// Whole-table access to named sheets.
///
/// `start_row` is 1-based, matching spreadsheet row numbers.
#[allow(async_fn_in_trait)]
pub trait TableStore {
    /// Every row of the sheet as text, header first. Empty sheet → empty vec.
    async fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    async fn clear(&self, sheet: &str) -> Result<()>;

    async fn write_rows(&self, sheet: &str, start_row: usize, rows: &[Vec<CellValue>])
        -> Result<()>;
}

/// The configured store, chosen at runtime.
pub enum Backend {
    Sheets(SheetsStore),
    Sqlite(SqliteStore),
}

impl TableStore for Backend {
    async fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        match self {
            Backend::Sheets(store) => store.read_all(sheet).await,
            Backend::Sqlite(store) => store.read_all(sheet).await,
        }
    }

    async fn clear(&self, sheet: &str) -> Result<()> {
        match self {
            Backend::Sheets(store) => store.clear(sheet).await,
            Backend::Sqlite(store) => store.clear(sheet).await,
        }
    }

    async fn write_rows(
        &self,
        sheet: &str,
        start_row: usize,
        rows: &[Vec<CellValue>],
    ) -> Result<()> {
        match self {
            Backend::Sheets(store) => store.write_rows(sheet, start_row, rows).await,
            Backend::Sqlite(store) => store.write_rows(sheet, start_row, rows).await,
        }
    }
}
