//! Scoring core: rubric, header resolution, reconciliation and writes.
//!
//! Everything here except the async load/save helpers is pure and operates on
//! an in-memory [`ScoreTable`].

pub mod columns;
pub mod normalize;
pub mod reconcile;
pub mod rubric;
pub mod sheet;
pub mod table;
pub mod week;
pub mod writer;

pub use columns::{resolve_columns, ColumnMap, Field};
pub use normalize::{coerce_or_default, coerce_signed_or_default, normalize_header, MAX_COUNT};
pub use reconcile::{
    coerce_counts, find_row, merge_edited, reconcile, recompute_totals, row_total, MergeMode,
    MergeSummary, ReconcileOutcome, Submission,
};
pub use rubric::{Rubric, RubricItem};
pub use sheet::{ScoreRow, ScoreSheet};
pub use table::ScoreTable;
pub use week::{calc_week, WeekCalendar};
pub use writer::{canonical_order, plan_write, write_table, WritePlan, WRITE_BATCH_ROWS};
