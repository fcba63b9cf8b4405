//! Weekly Score Library
//!
//! Rubric-driven weekly discipline and achievement scoring for an educational
//! center. Teachers log per-class weekly counts of violations and merits, a
//! spreadsheet is the system of record, and an AI assistant summarizes the
//! results.
//!
//! ## Features
//!
//! - **Rubric Scoring**: Fixed catalog of weighted items, totals always recomputed
//! - **Header Drift Tolerance**: Columns are resolved from whatever header the sheet has
//! - **Canonical Writes**: The sheet is rewritten in a deterministic column order
//! - **Two Backends**: Google Sheets as the system of record, SQLite for offline use
//! - **Role-aware Sessions**: Teachers submit for their class, admins bulk-edit
//! - **AI Summary & Chat**: Weekly summaries grounded in the score table
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use weekly_score::scoring::{calc_week, reconcile, Rubric, ScoreSheet, Submission};
//! use weekly_score::storage::SqliteStore;
//! use std::collections::BTreeMap;
//!
//! # async fn example() -> weekly_score::Result<()> {
//! let store = SqliteStore::new_in_memory()?;
//! let rubric = Rubric::standard();
//! let mut sheet = ScoreSheet::load(&store, "Score", &rubric).await?;
//!
//! let week = calc_week(chrono::NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());
//! let counts = BTreeMap::from([("late_arrival".to_string(), 2)]);
//! reconcile(
//!     &mut sheet.table,
//!     &sheet.columns,
//!     &rubric,
//!     &Submission::new("10A1", week, &counts, "gv01", "2025-11-03 08:00:00"),
//! )?;
//! sheet.save(&store, &rubric).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export WEEKLY_SCORE_SPREADSHEET_ID=1AbC...
//! export WEEKLY_SCORE_ACCESS_TOKEN=$(gcloud auth print-access-token)
//! export GEMINI_API_KEY=...
//! ```

pub mod accounts;
pub mod assistant;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod scoring;
pub mod storage;

// Re-export commonly used types
pub use accounts::{Role, Session};
pub use cli::types::Week;
pub use config::{Config, ACCOUNTS_SHEET, SCORE_SHEET};
pub use error::{Result, ScoreError};
pub use scoring::{ColumnMap, Rubric, RubricItem, ScoreRow, ScoreSheet, ScoreTable};
