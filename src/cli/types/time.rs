//! Time-related types for weekly scoring.

use crate::error::{Result, ScoreError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Type-safe wrapper for school week numbers.
///
/// Week numbers are always at least 1; see [`crate::scoring::calc_week`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Week(pub u32);

impl Week {
    pub fn new(week: u32) -> Self {
        Self(week.max(1))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for Week {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Week {
    type Err = ScoreError;

    /// Strict: `0` is rejected rather than clamped, so a stored `0` does not
    /// read back as week 1.
    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse::<NonZeroU32>()?.get()))
    }
}

/// Parse a `YYYY-MM-DD` date from the command line.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
}
