//! School week arithmetic anchored to a fixed epoch.

use crate::cli::types::Week;
use chrono::NaiveDate;

/// Epoch date: the Monday that starts [`EPOCH_WEEK`].
pub const EPOCH_DATE: (i32, u32, u32) = (2025, 10, 27);
pub const EPOCH_WEEK: u32 = 8;

/// Maps calendar dates to week numbers relative to an epoch (date, week) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalendar {
    epoch_date: NaiveDate,
    epoch_week: u32,
}

impl WeekCalendar {
    pub fn new(epoch_date: NaiveDate, epoch_week: u32) -> Self {
        Self {
            epoch_date,
            epoch_week,
        }
    }

    /// `epoch_week + floor((date - epoch_date) / 7)`, never below 1.
    pub fn week_of(&self, date: NaiveDate) -> Week {
        let days = (date - self.epoch_date).num_days();
        let week = i64::from(self.epoch_week) + days.div_euclid(7);
        Week::new(week.clamp(1, i64::from(u32::MAX)) as u32)
    }
}

impl Default for WeekCalendar {
    fn default() -> Self {
        let (y, m, d) = EPOCH_DATE;
        let epoch_date = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
        Self::new(epoch_date, EPOCH_WEEK)
    }
}

/// Week number for `date` using the standard epoch.
pub fn calc_week(date: NaiveDate) -> Week {
    WeekCalendar::default().week_of(date)
}
