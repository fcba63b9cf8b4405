//! SQLite-backed table store
//!
//! Cells are kept as text in a single table keyed by (sheet, row, column),
//! mirroring what the spreadsheet API hands back on read.

use anyhow::{Context, Result as AnyResult};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CellValue, TableStore};
use crate::Result;

pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn initialize_schema(&self) -> AnyResult<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS sheet_cells (
                    sheet TEXT NOT NULL,
                    row_idx INTEGER NOT NULL,
                    col_idx INTEGER NOT NULL,
                    value TEXT NOT NULL,
                    PRIMARY KEY (sheet, row_idx, col_idx)
                )",
                [],
            )
            .context("creating sheet_cells table")?;
        Ok(())
    }

    fn read_rows(&self, sheet: &str) -> AnyResult<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT row_idx, col_idx, value FROM sheet_cells
             WHERE sheet = ?
             ORDER BY row_idx, col_idx",
        )?;
        let cells = stmt.query_map(params![sheet], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for cell in cells {
            let (row_idx, col_idx, value) = cell?;
            let (r, c) = (row_idx as usize - 1, col_idx as usize);
            if rows.len() <= r {
                rows.resize(r + 1, Vec::new());
            }
            let row = &mut rows[r];
            if row.len() <= c {
                row.resize(c + 1, String::new());
            }
            row[c] = value;
        }
        Ok(rows)
    }

    fn replace_rows(&self, sheet: &str, start_row: usize, rows: &[Vec<CellValue>]) -> AnyResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO sheet_cells (sheet, row_idx, col_idx, value)
                 VALUES (?, ?, ?, ?)",
            )?;
            for (offset, row) in rows.iter().enumerate() {
                let row_idx = (start_row + offset) as i64;
                for (col_idx, cell) in row.iter().enumerate() {
                    stmt.execute(params![sheet, row_idx, col_idx as i64, cell.to_string()])?;
                }
            }
        }
        tx.commit().context("committing sheet rows")?;
        Ok(())
    }
}

impl TableStore for SqliteStore {
    async fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let rows = self
            .read_rows(sheet)
            .with_context(|| format!("reading sheet '{}'", sheet))?;
        debug!(sheet, rows = rows.len(), "read sqlite sheet");
        Ok(rows)
    }

    async fn clear(&self, sheet: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sheet_cells WHERE sheet = ?", params![sheet])?;
        Ok(())
    }

    async fn write_rows(
        &self,
        sheet: &str,
        start_row: usize,
        rows: &[Vec<CellValue>],
    ) -> Result<()> {
        self.replace_rows(sheet, start_row.max(1), rows)
            .with_context(|| format!("writing sheet '{}'", sheet))?;
        debug!(sheet, start_row, rows = rows.len(), "wrote sqlite rows");
        Ok(())
    }
}
