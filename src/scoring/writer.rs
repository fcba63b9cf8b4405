//! Canonical-order serialization of the score table.

use tracing::info;

use super::{coerce_or_default, coerce_signed_or_default, ColumnMap, Field, Rubric, ScoreTable};
use crate::storage::{CellValue, TableStore};
use crate::Result;

/// Rows per write request, header included in the first batch.
pub const WRITE_BATCH_ROWS: usize = 500;

/// Leading columns, in written order.
const LEADING_FIELDS: [Field; 4] = [Field::Time, Field::User, Field::Week, Field::Class];

/// Header and typed cells ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl WritePlan {
    /// Header plus data rows split into batches of at most `size` rows,
    /// each paired with its 1-based starting row number.
    pub fn batches(&self, size: usize) -> Vec<(usize, Vec<Vec<CellValue>>)> {
        let size = size.max(1);
        let header: Vec<CellValue> = self
            .header
            .iter()
            .map(|h| CellValue::Text(h.clone()))
            .collect();

        let all: Vec<Vec<CellValue>> = std::iter::once(header)
            .chain(self.rows.iter().cloned())
            .collect();

        all.chunks(size)
            .enumerate()
            .map(|(i, chunk)| (1 + i * size, chunk.to_vec()))
            .collect()
    }
}

/// `[TIME, USER, WEEK, CLASS]`, rubric item columns in rubric order, `TOTAL`.
/// A column bound twice is written once, at its first position.
pub fn canonical_order(columns: &ColumnMap, rubric: &Rubric) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let leading = LEADING_FIELDS.iter().map(|f| columns.field(*f));
    let items = rubric
        .items()
        .iter()
        .filter_map(|item| columns.item(&item.key));
    let trailing = std::iter::once(columns.total.as_str());

    for name in leading.chain(items).chain(trailing) {
        if !order.iter().any(|c| c == name) {
            order.push(name.to_string());
        }
    }
    order
}

/// Build the write plan, materializing any column the order needs.
///
/// Rubric counts and the total are emitted as numbers; everything else as
/// text. Columns outside the canonical order are not written.
pub fn plan_write(table: &mut ScoreTable, columns: &ColumnMap, rubric: &Rubric) -> WritePlan {
    let header = canonical_order(columns, rubric);
    let numeric: Vec<bool> = header
        .iter()
        .map(|name| *name == columns.total || columns.items().any(|(_, c)| c == name))
        .collect();

    for (name, is_numeric) in header.iter().zip(&numeric) {
        table.ensure_column(name, if *is_numeric { "0" } else { "" });
    }

    let rows = (0..table.len())
        .map(|row| {
            header
                .iter()
                .zip(&numeric)
                .map(|(name, is_numeric)| {
                    let cell = table.get(row, name).unwrap_or("");
                    match (*is_numeric, *name == columns.total) {
                        (true, true) => CellValue::Number(coerce_signed_or_default(cell)),
                        (true, false) => CellValue::Number(coerce_or_default(cell)),
                        (false, _) => CellValue::Text(cell.to_string()),
                    }
                })
                .collect()
        })
        .collect();

    WritePlan { header, rows }
}

/// Clear the sheet and write the table in canonical order, batched.
/// Returns the number of data rows written.
pub async fn write_table<S: TableStore>(
    store: &S,
    sheet: &str,
    table: &mut ScoreTable,
    columns: &ColumnMap,
    rubric: &Rubric,
) -> Result<usize> {
    let plan = plan_write(table, columns, rubric);
    let batches = plan.batches(WRITE_BATCH_ROWS);

    store.clear(sheet).await?;
    for (start_row, rows) in &batches {
        store.write_rows(sheet, *start_row, rows).await?;
    }

    info!(
        sheet,
        rows = plan.rows.len(),
        batches = batches.len(),
        "wrote score table"
    );
    Ok(plan.rows.len())
}
