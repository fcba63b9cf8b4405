//! CLI argument definitions and parsing.

pub mod types;

use crate::config::PASSWORD_ENV_VAR;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use types::{parse_date, BackendKind, CountEntry, Week};

#[derive(Debug, Parser)]
#[clap(
    name = "weekly-score",
    about = "Weekly class discipline and achievement scoring"
)]
pub struct WeeklyScore {
    /// Table store to use (or set `WEEKLY_SCORE_BACKEND`).
    #[clap(long, global = true, value_enum)]
    pub backend: Option<BackendKind>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in with an account from the account sheet
    ///
    /// The password is taken from `--password`, then `WEEKLY_SCORE_PASSWORD`,
    /// and otherwise read from the first line of stdin.
    Login {
        #[clap(long, short)]
        username: String,

        #[clap(long, short, env = PASSWORD_ENV_VAR, hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Submit this week's counts for a class.
    ///
    /// Every rubric item not given is recorded as 0. Resubmitting the same
    /// class and week overwrites the earlier row.
    Submit {
        /// Rubric count, repeatable: `-c late_arrival=2 -c grade_10=1`.
        #[clap(long = "count", short = 'c', value_name = "KEY=COUNT")]
        counts: Vec<CountEntry>,

        /// Class name; defaults to the logged-in teacher's class.
        #[clap(long)]
        class: Option<String>,

        /// Date the week is derived from (YYYY-MM-DD, default today).
        #[clap(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show score rows (your class, or every class for admins)
    Show {
        /// Only this class.
        #[clap(long)]
        class: Option<String>,

        /// Only this week.
        #[clap(long, short)]
        week: Option<Week>,

        /// Output JSON records (the format `edit` accepts).
        #[clap(long)]
        json: bool,
    },

    /// Merge an edited JSON table into the score sheet (admin only)
    Edit {
        /// JSON array of row objects keyed by column header.
        #[clap(long, short)]
        file: PathBuf,

        /// Replace every row instead of merging by class and week.
        #[clap(long)]
        replace: bool,
    },

    /// AI-written summary of the whole score table
    Summary,

    /// Ask the AI assistant about the score data
    Chat {
        /// Question to ask; omit to print the conversation so far.
        question: Option<String>,

        /// Start a new conversation with fresh data.
        #[clap(long)]
        reset: bool,
    },

    /// Print the week number for a date
    Week {
        /// YYYY-MM-DD, default today.
        #[clap(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// List rubric items and weights
    Rubric {
        #[clap(long)]
        json: bool,
    },

    /// Write the canonical header to an empty score sheet
    InitSheet,

    /// Load a sheet from a JSON file (array of rows or array of objects)
    Import {
        /// Target sheet.
        #[clap(long, default_value = crate::config::SCORE_SHEET)]
        sheet: String,

        #[clap(long, short)]
        file: PathBuf,
    },
}
