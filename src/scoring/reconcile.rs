//! Find-or-create reconciliation of (class, week) rows and table-wide totals.

use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{
    coerce_or_default, resolve_columns, ColumnMap, Field, Rubric, ScoreTable, MAX_COUNT,
};
use crate::{cli::types::Week, config::SCORE_SHEET, error::ScoreError, Result};


/// One teacher's counts for a class and week.
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub class_name: &'a str,
    pub week: Week,
    pub counts: &'a BTreeMap<String, i64>,
    pub submitter: &'a str,
    pub timestamp: &'a str,
}

impl<'a> Submission<'a> {
    pub fn new(
        class_name: &'a str,
        week: Week,
        counts: &'a BTreeMap<String, i64>,
        submitter: &'a str,
        timestamp: &'a str,
    ) -> Self {
        Self {
            class_name,
            week,
            counts,
            submitter,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Updated { row: usize, total: i64 },
    Inserted { row: usize, total: i64 },
}

impl ReconcileOutcome {
    pub fn row(&self) -> usize {
        match self {
            ReconcileOutcome::Updated { row, .. } | ReconcileOutcome::Inserted { row, .. } => *row,
        }
    }

    pub fn total(&self) -> i64 {
        match self {
            ReconcileOutcome::Updated { total, .. } | ReconcileOutcome::Inserted { total, .. } => {
                *total
            }
        }
    }
}

/// How an admin's edited table is applied to the canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Overwrite matching (class, week) rows in place, append the rest.
    #[default]
    Merge,
    /// Drop every existing row first; the edited set becomes the table.
    Replace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub updated: usize,
    pub appended: usize,
    pub skipped: usize,
}

/// Index of the row for `class_name` and `week`, comparing the week as text.
pub fn find_row(
    table: &ScoreTable,
    columns: &ColumnMap,
    class_name: &str,
    week: &str,
) -> Option<usize> {
    let class_idx = table.column_index(&columns.class)?;
    let week_idx = table.column_index(&columns.week)?;
    let class_name = class_name.trim();
    let week = week.trim();

    table
        .rows()
        .iter()
        .position(|row| row[class_idx].trim() == class_name && row[week_idx].trim() == week)
}

/// Weighted total of one row, with count cells read through coerce-or-default.
pub fn row_total(table: &ScoreTable, row: usize, columns: &ColumnMap, rubric: &Rubric) -> i64 {
    rubric
        .items()
        .iter()
        .map(|item| {
            let count = columns
                .item(&item.key)
                .and_then(|column| table.get(row, column))
                .map(coerce_or_default)
                .unwrap_or(0);
            count.saturating_mul(item.weight)
        })
        .fold(0i64, i64::saturating_add)
}

/// Recompute the total of every row in the table.
pub fn recompute_totals(table: &mut ScoreTable, columns: &ColumnMap, rubric: &Rubric) {
    for row in 0..table.len() {
        let total = row_total(table, row, columns, rubric);
        table.set(row, &columns.total, total.to_string());
    }
}

/// Rewrite every rubric count cell as a plain non-negative integer.
pub fn coerce_counts(table: &mut ScoreTable, columns: &ColumnMap, rubric: &Rubric) {
    for item in rubric.items() {
        let Some(column) = columns.item(&item.key) else {
            continue;
        };
        for row in 0..table.len() {
            let count = table.get(row, column).map(coerce_or_default).unwrap_or(0);
            table.set(row, column, count.to_string());
        }
    }
}

/// Apply a submission: update the (class, week) row or append a new one, then
/// recompute totals for the whole table.
///
/// Every rubric count is written; keys missing from the submission become 0.
pub fn reconcile(
    table: &mut ScoreTable,
    columns: &ColumnMap,
    rubric: &Rubric,
    submission: &Submission<'_>,
) -> Result<ReconcileOutcome> {
    if !table.is_loaded() {
        return Err(ScoreError::EmptyTable {
            sheet: SCORE_SHEET.to_string(),
        });
    }
    if let Some(key) = submission.counts.keys().find(|k| !rubric.contains(k)) {
        return Err(ScoreError::UnknownRubricItem { key: key.clone() });
    }

    let week = submission.week.to_string();
    let existing = find_row(table, columns, submission.class_name, &week);
    let row = match existing {
        Some(row) => row,
        None => {
            let row = table.push_empty_row();
            table.set(row, &columns.class, submission.class_name);
            table.set(row, &columns.week, week.as_str());
            row
        }
    };

    for item in rubric.items() {
        let count = submission.counts.get(&item.key).copied().unwrap_or(0).clamp(0, MAX_COUNT);
        if let Some(column) = columns.item(&item.key) {
            table.set(row, column, count.to_string());
        }
    }
    table.set(row, &columns.time, submission.timestamp);
    table.set(row, &columns.user, submission.submitter);

    recompute_totals(table, columns, rubric);
    let total = row_total(table, row, columns, rubric);

    debug!(
        class = submission.class_name,
        week = %submission.week,
        row,
        total,
        "reconciled submission"
    );

    Ok(match existing {
        Some(_) => ReconcileOutcome::Updated { row, total },
        None => ReconcileOutcome::Inserted { row, total },
    })
}

/// Merge an admin-edited table into the canonical table by (class, week).
///
/// The edited table's own headers are resolved first, so it may use any
/// header spelling; only columns it actually carries are copied. Counts are
/// coerced, rows with neither class nor week are skipped, and totals are
/// recomputed for the whole canonical table.
pub fn merge_edited(
    table: &mut ScoreTable,
    columns: &ColumnMap,
    rubric: &Rubric,
    mut edited: ScoreTable,
    mode: MergeMode,
) -> Result<MergeSummary> {
    if !table.is_loaded() {
        return Err(ScoreError::EmptyTable {
            sheet: SCORE_SHEET.to_string(),
        });
    }

    if mode == MergeMode::Replace {
        table.clear_rows();
    }
    let mut summary = MergeSummary::default();
    if !edited.is_loaded() {
        recompute_totals(table, columns, rubric);
        return Ok(summary);
    }

    let present = edited.columns().to_vec();
    let edited_columns = resolve_columns(&mut edited, rubric);
    coerce_counts(&mut edited, &edited_columns, rubric);

    let mut bound: Vec<(&str, &str)> = Field::ALL
        .iter()
        .filter(|f| **f != Field::Total)
        .map(|f| (edited_columns.field(*f), columns.field(*f)))
        .collect();
    for item in rubric.items() {
        if let (Some(from), Some(to)) = (edited_columns.item(&item.key), columns.item(&item.key)) {
            bound.push((from, to));
        }
    }
    let extra: Vec<&String> = present
        .iter()
        .filter(|c| {
            **c != edited_columns.total && !bound.iter().any(|(from, _)| *from == c.as_str())
        })
        .collect();
    // Columns the editor never supplied are left alone
    bound.retain(|(from, _)| present.iter().any(|c| c.as_str() == *from));

    for r in 0..edited.len() {
        let class_name = edited.get(r, &edited_columns.class).unwrap_or("").trim();
        let week = edited.get(r, &edited_columns.week).unwrap_or("").trim();
        if class_name.is_empty() && week.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let row = match find_row(table, columns, class_name, week) {
            Some(row) => {
                summary.updated += 1;
                row
            }
            None => {
                summary.appended += 1;
                table.push_empty_row()
            }
        };

        for (from, to) in &bound {
            let value = edited.get(r, from).unwrap_or("").trim().to_string();
            table.set(row, to, value);
        }
        for column in &extra {
            let value = edited.get(r, column).unwrap_or("").to_string();
            table.set(row, column, value);
        }
    }

    recompute_totals(table, columns, rubric);
    info!(
        updated = summary.updated,
        appended = summary.appended,
        skipped = summary.skipped,
        ?mode,
        "merged edited table"
    );
    Ok(summary)
}
