//! `KEY=COUNT` arguments for rubric item submissions.

use crate::error::{Result, ScoreError};
use std::fmt;
use std::str::FromStr;

/// One `--count KEY=COUNT` entry from the command line.
///
/// The key is validated against the rubric later; the count stays raw so the
/// coerce-or-default policy decides what a malformed value means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub key: String,
    pub raw_count: String,
}

impl FromStr for CountEntry {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (key, count) = s.split_once('=').ok_or_else(|| ScoreError::InvalidCountEntry {
            entry: s.to_string(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ScoreError::InvalidCountEntry {
                entry: s.to_string(),
            });
        }
        Ok(Self {
            key: key.to_string(),
            raw_count: count.trim().to_string(),
        })
    }
}

impl fmt::Display for CountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.raw_count)
    }
}
