//! The score sheet as loaded from a store, plus typed row views.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{
    coerce_or_default, coerce_signed_or_default, resolve_columns, row_total, writer, ColumnMap,
    Rubric, ScoreTable,
};
use crate::{cli::types::Week, storage::TableStore, Result};

/// A named sheet, its table and the columns resolved against its header.
#[derive(Debug, Clone)]
pub struct ScoreSheet {
    pub name: String,
    pub table: ScoreTable,
    pub columns: ColumnMap,
}

/// One (class, week) row with typed counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRow {
    pub class_name: String,
    pub week: Option<Week>,
    pub timestamp: String,
    pub submitted_by: String,
    pub item_counts: BTreeMap<String, i64>,
    pub total: i64,
}

impl ScoreSheet {
    /// Wrap raw values (header first) and resolve columns.
    pub fn from_values(name: &str, values: Vec<Vec<String>>, rubric: &Rubric) -> Self {
        let mut table = ScoreTable::from_values(values);
        let columns = resolve_columns(&mut table, rubric);
        Self {
            name: name.to_string(),
            table,
            columns,
        }
    }

    pub async fn load<S: TableStore>(store: &S, name: &str, rubric: &Rubric) -> Result<Self> {
        let values = store.read_all(name).await?;
        Ok(Self::from_values(name, values, rubric))
    }

    /// Rewrite the whole sheet in canonical order. Returns rows written.
    pub async fn save<S: TableStore>(&mut self, store: &S, rubric: &Rubric) -> Result<usize> {
        writer::write_table(store, &self.name, &mut self.table, &self.columns, rubric).await
    }

    /// Write only the default header, turning an empty sheet into a loaded one.
    pub async fn initialize<S: TableStore>(store: &S, name: &str, rubric: &Rubric) -> Result<Self> {
        let mut sheet = Self {
            name: name.to_string(),
            table: ScoreTable::default(),
            columns: ColumnMap::default_layout(rubric),
        };
        let header = writer::canonical_order(&sheet.columns, rubric);
        sheet.table = ScoreTable::new(header);
        sheet.save(store, rubric).await?;
        Ok(sheet)
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_loaded()
    }

    /// Resolve again after the table's header changed.
    pub fn refresh_columns(&mut self, rubric: &Rubric) {
        self.columns = resolve_columns(&mut self.table, rubric);
    }

    /// Every row, with the total recomputed from the counts.
    pub fn score_rows(&self, rubric: &Rubric) -> Vec<ScoreRow> {
        (0..self.table.len())
            .map(|row| self.score_row(row, rubric))
            .collect()
    }

    pub fn rows_for_class(&self, class_name: &str, rubric: &Rubric) -> Vec<ScoreRow> {
        let class_name = class_name.trim();
        self.score_rows(rubric)
            .into_iter()
            .filter(|row| row.class_name == class_name)
            .collect()
    }

    /// A copy holding only the rows of one class.
    pub fn restricted_to_class(&self, class_name: &str) -> ScoreSheet {
        let class_name = class_name.trim();
        let mut sheet = self.clone();
        if let Some(idx) = sheet.table.column_index(&sheet.columns.class) {
            sheet.table.retain_rows(|row| row[idx].trim() == class_name);
        }
        sheet
    }

    fn score_row(&self, row: usize, rubric: &Rubric) -> ScoreRow {
        let cell = |column: &str| self.table.get(row, column).unwrap_or("").trim().to_string();

        let item_counts = rubric
            .items()
            .iter()
            .map(|item| {
                let count = self
                    .columns
                    .item(&item.key)
                    .and_then(|column| self.table.get(row, column))
                    .map(coerce_or_default)
                    .unwrap_or(0);
                (item.key.clone(), count)
            })
            .collect();

        ScoreRow {
            class_name: cell(&self.columns.class),
            week: cell(&self.columns.week).parse().ok(),
            timestamp: cell(&self.columns.time),
            submitted_by: cell(&self.columns.user),
            item_counts,
            total: row_total(&self.table, row, &self.columns, rubric),
        }
    }

    /// Total as stored in the sheet, which may be stale until the next write.
    pub fn stored_total(&self, row: usize) -> i64 {
        self.table
            .get(row, &self.columns.total)
            .map(coerce_signed_or_default)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RubricItem;
    use crate::storage::SqliteStore;

    fn rubric() -> Rubric {
        Rubric::new(vec![
            RubricItem::new("late_arrival", "Đi trễ", -2, &["di tre"]),
            RubricItem::new("grade_10", "Điểm 10", 5, &["diem 10"]),
        ])
    }

    fn values(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_score_rows_recompute_stale_total() {
        let sheet = ScoreSheet::from_values(
            "Score",
            values(&[
                &["Lớp", "Tuần", "Đi trễ", "Điểm 10", "Tổng điểm"],
                &["10A1", "9", "1", "3", "999"],
                &["10A2", "x", "", "", ""],
                &["10A3", "0", "", "", ""],
            ]),
            &rubric(),
        );
        let rows = sheet.score_rows(&rubric());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].total, 13);
        assert_eq!(rows[0].week, Some(Week(9)));
        assert_eq!(rows[0].item_counts["grade_10"], 3);
        assert_eq!(sheet.stored_total(0), 999);
        assert_eq!(rows[1].week, None);
        assert_eq!(rows[1].total, 0);
        // A stored week 0 is not a valid week and is not shown as week 1
        assert_eq!(rows[2].week, None);
    }

    #[test]
    fn test_rows_for_class_filters_trimmed_name() {
        let sheet = ScoreSheet::from_values(
            "Score",
            values(&[
                &["Lớp", "Tuần"],
                &["10A1", "8"],
                &["10A2", "8"],
                &["10A1", "9"],
            ]),
            &rubric(),
        );
        let rows = sheet.rows_for_class(" 10A1 ", &rubric());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.class_name == "10A1"));

        let restricted = sheet.restricted_to_class("10A2");
        assert_eq!(restricted.table.len(), 1);
        assert_eq!(sheet.table.len(), 3);
    }

    #[tokio::test]
    async fn test_initialize_then_load_is_loaded() {
        let store = SqliteStore::new_in_memory().unwrap();
        let rubric = rubric();

        let empty = ScoreSheet::load(&store, "Score", &rubric).await.unwrap();
        assert!(!empty.is_loaded());

        ScoreSheet::initialize(&store, "Score", &rubric).await.unwrap();
        let loaded = ScoreSheet::load(&store, "Score", &rubric).await.unwrap();
        assert!(loaded.is_loaded());
        assert!(loaded.table.is_empty());
        assert_eq!(loaded.columns, ColumnMap::default_layout(&rubric));
    }
}
