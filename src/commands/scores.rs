//! Score sheet commands: submit, show, edit, init-sheet, import

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use super::common::{timestamp_now, CommandContext};
use crate::{
    accounts::Session,
    cli::types::{CountEntry, Week},
    config::SCORE_SHEET,
    error::ScoreError,
    scoring::{
        calc_week, coerce_counts, coerce_or_default, merge_edited, reconcile, recompute_totals,
        row_total, MergeMode, MergeSummary, ReconcileOutcome, Rubric, ScoreSheet, ScoreTable,
        Submission, WritePlan, WRITE_BATCH_ROWS,
    },
    storage::{CellValue, TableStore},
    Result,
};

/// Parameters for a submission.
#[derive(Debug, Clone)]
pub struct SubmitParams {
    pub counts: Vec<CountEntry>,
    pub class: Option<String>,
    pub date: NaiveDate,
}

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub class_name: String,
    pub week: Week,
    pub outcome: ReconcileOutcome,
}

/// Validate keys against the rubric and coerce the counts. A key given
/// twice keeps its last value.
pub fn build_counts(rubric: &Rubric, entries: &[CountEntry]) -> Result<BTreeMap<String, i64>> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        if !rubric.contains(&entry.key) {
            return Err(ScoreError::UnknownRubricItem {
                key: entry.key.clone(),
            });
        }
        counts.insert(entry.key.clone(), coerce_or_default(&entry.raw_count));
    }
    Ok(counts)
}

/// Record a teacher's counts for one class and the week of `params.date`.
pub async fn submit<S: TableStore>(
    ctx: &CommandContext<S>,
    session: &Session,
    params: &SubmitParams,
    timestamp: &str,
) -> Result<SubmitReport> {
    let counts = build_counts(&ctx.rubric, &params.counts)?;
    let class_name = params
        .class
        .as_deref()
        .unwrap_or(session.class_name.as_str())
        .trim()
        .to_string();
    if class_name.is_empty() {
        return Err(ScoreError::MissingClass);
    }
    session.require_class_access(&class_name, "submit")?;

    let week = calc_week(params.date);
    let mut sheet = ctx.load_scores().await?;
    let outcome = reconcile(
        &mut sheet.table,
        &sheet.columns,
        &ctx.rubric,
        &Submission::new(&class_name, week, &counts, &session.username, timestamp),
    )?;
    sheet.save(&ctx.store, &ctx.rubric).await?;

    Ok(SubmitReport {
        class_name,
        week,
        outcome,
    })
}

/// Handle the submit command
pub async fn handle_submit<S: TableStore>(
    ctx: &CommandContext<S>,
    params: SubmitParams,
) -> Result<()> {
    let session = ctx.session()?;
    let report = submit(ctx, &session, &params, &timestamp_now()).await?;
    match report.outcome {
        ReconcileOutcome::Updated { total, .. } => println!(
            "✓ Updated {} week {}. Total = {}",
            report.class_name, report.week, total
        ),
        ReconcileOutcome::Inserted { total, .. } => println!(
            "✓ Added {} week {}. Total = {}",
            report.class_name, report.week, total
        ),
    }
    Ok(())
}

/// Indices of the rows `session` may see, narrowed by the optional filters.
///
/// Users always see only their own class; asking for another is denied.
pub fn visible_rows(
    sheet: &ScoreSheet,
    session: &Session,
    class: Option<&str>,
    week: Option<Week>,
) -> Result<Vec<usize>> {
    let class = match (class, session.is_admin()) {
        (Some(c), _) => {
            session.require_class_access(c, "view")?;
            Some(c.trim().to_string())
        }
        (None, true) => None,
        (None, false) => Some(session.class_name.trim().to_string()),
    };
    let week = week.map(|w| w.to_string());

    let cell = |row: usize, column: &str| sheet.table.get(row, column).unwrap_or("").trim();
    Ok((0..sheet.table.len())
        .filter(|row| {
            class.as_deref().map_or(true, |c| cell(*row, &sheet.columns.class) == c)
                && week.as_deref().map_or(true, |w| cell(*row, &sheet.columns.week) == w)
        })
        .collect())
}

/// JSON records for the given rows, totals recomputed and numeric.
pub fn row_records(sheet: &ScoreSheet, rubric: &Rubric, rows: &[usize]) -> Vec<Map<String, Value>> {
    let records = sheet.table.to_records();
    rows.iter()
        .filter_map(|row| {
            let mut record = records.get(*row)?.clone();
            let total = row_total(&sheet.table, *row, &sheet.columns, rubric);
            record.insert(sheet.columns.total.clone(), Value::from(total));
            Some(record)
        })
        .collect()
}

/// Handle the show command
pub async fn handle_show<S: TableStore>(
    ctx: &CommandContext<S>,
    class: Option<String>,
    week: Option<Week>,
    as_json: bool,
) -> Result<()> {
    let session = ctx.session()?;
    let sheet = ctx.load_scores().await?;
    let rows = visible_rows(&sheet, &session, class.as_deref(), week)?;

    if as_json {
        let records = row_records(&sheet, &ctx.rubric, &rows);
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No rows");
        return Ok(());
    }
    let all = sheet.score_rows(&ctx.rubric);
    for row in rows.iter().filter_map(|r| all.get(*r)) {
        let week = row.week.map(|w| w.to_string()).unwrap_or_else(|| "?".into());
        let items: Vec<String> = ctx
            .rubric
            .items()
            .iter()
            .filter_map(|item| {
                let count = row.item_counts.get(&item.key).copied().unwrap_or(0);
                (count > 0).then(|| format!("{}×{}", item.label, count))
            })
            .collect();
        println!(
            "{:<8} week {:<3} total {:>5}  {}  [{} {}]",
            row.class_name,
            week,
            row.total,
            items.join(", "),
            row.submitted_by,
            row.timestamp
        );
    }
    Ok(())
}

/// Merge or replace score rows from a JSON records file (admin only).
pub async fn edit<S: TableStore>(
    ctx: &CommandContext<S>,
    session: &Session,
    file: &Path,
    mode: MergeMode,
) -> Result<MergeSummary> {
    session.require_admin("edit")?;
    let raw = std::fs::read_to_string(file)?;
    let records: Vec<Map<String, Value>> = serde_json::from_str(&raw)?;
    let edited = ScoreTable::from_records(&records);

    let mut sheet = ctx.load_scores().await?;
    let summary = merge_edited(&mut sheet.table, &sheet.columns, &ctx.rubric, edited, mode)?;
    sheet.save(&ctx.store, &ctx.rubric).await?;
    Ok(summary)
}

/// Handle the edit command
pub async fn handle_edit<S: TableStore>(
    ctx: &CommandContext<S>,
    file: &Path,
    replace: bool,
) -> Result<()> {
    let session = ctx.session()?;
    let mode = if replace {
        MergeMode::Replace
    } else {
        MergeMode::Merge
    };
    let summary = edit(ctx, &session, file, mode).await?;
    println!(
        "✓ Saved changes: {} updated, {} added, {} skipped",
        summary.updated, summary.appended, summary.skipped
    );
    Ok(())
}

/// Write the canonical header to an empty score sheet. Returns false when
/// the sheet already has a header.
pub async fn init_sheet<S: TableStore>(ctx: &CommandContext<S>) -> Result<bool> {
    let sheet = ctx.load_scores().await?;
    if sheet.is_loaded() {
        return Ok(false);
    }
    ScoreSheet::initialize(&ctx.store, SCORE_SHEET, &ctx.rubric).await?;
    Ok(true)
}

/// Handle the init-sheet command
pub async fn handle_init_sheet<S: TableStore>(ctx: &CommandContext<S>) -> Result<()> {
    if init_sheet(ctx).await? {
        println!("✓ Wrote header to sheet '{}'", SCORE_SHEET);
    } else {
        println!("Sheet '{}' already has a header; nothing to do", SCORE_SHEET);
    }
    Ok(())
}

/// Parse an import file: an array of rows (header first) or an array of
/// objects keyed by column header.
pub fn parse_import(raw: &str) -> Result<Vec<Vec<String>>> {
    let value: Value = serde_json::from_str(raw)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ScoreError::InvalidConfig {
                key: "import file".to_string(),
                value: format!("expected a JSON array, found {}", type_name(&other)),
            })
        }
    };

    if items.is_empty() {
        return Ok(Vec::new());
    }
    if items.iter().all(Value::is_object) {
        let records: Vec<Map<String, Value>> = items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let table = ScoreTable::from_records(&records);
        let mut values = vec![table.columns().to_vec()];
        values.extend(table.rows().iter().cloned());
        return Ok(values);
    }

    items
        .into_iter()
        .map(|row| match row {
            Value::Array(cells) => Ok(cells.into_iter().map(cell_text).collect()),
            other => Err(ScoreError::InvalidConfig {
                key: "import file".to_string(),
                value: format!("expected a row array, found {}", type_name(&other)),
            }),
        })
        .collect()
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Replace a sheet with the file's contents. The score sheet is normalized
/// (counts coerced, totals recomputed, canonical order); other sheets are
/// written as given. Returns the number of data rows written.
pub async fn import<S: TableStore>(
    ctx: &CommandContext<S>,
    sheet_name: &str,
    file: &Path,
) -> Result<usize> {
    let raw = std::fs::read_to_string(file)?;
    let values = parse_import(&raw)?;

    if sheet_name == SCORE_SHEET {
        let mut sheet = ScoreSheet::from_values(sheet_name, values, &ctx.rubric);
        if !sheet.is_loaded() {
            return Err(ScoreError::EmptyTable {
                sheet: sheet_name.to_string(),
            });
        }
        coerce_counts(&mut sheet.table, &sheet.columns, &ctx.rubric);
        recompute_totals(&mut sheet.table, &sheet.columns, &ctx.rubric);
        return sheet.save(&ctx.store, &ctx.rubric).await;
    }

    let mut rows = values.into_iter();
    let Some(header) = rows.next() else {
        warn!(sheet = sheet_name, "import file is empty; clearing sheet");
        ctx.store.clear(sheet_name).await?;
        return Ok(0);
    };
    let plan = WritePlan {
        header,
        rows: rows
            .map(|row| row.into_iter().map(CellValue::Text).collect())
            .collect(),
    };

    ctx.store.clear(sheet_name).await?;
    for (start_row, batch) in plan.batches(WRITE_BATCH_ROWS) {
        ctx.store.write_rows(sheet_name, start_row, &batch).await?;
    }
    info!(sheet = sheet_name, rows = plan.rows.len(), "imported sheet");
    Ok(plan.rows.len())
}

/// Handle the import command
pub async fn handle_import<S: TableStore>(
    ctx: &CommandContext<S>,
    sheet_name: &str,
    file: &Path,
) -> Result<()> {
    let rows = import(ctx, sheet_name, file).await?;
    println!("✓ Imported {} rows into '{}'", rows, sheet_name);
    Ok(())
}
