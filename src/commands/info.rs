//! Offline commands: week and rubric

use chrono::NaiveDate;

use crate::{
    cli::types::Week,
    scoring::{calc_week, Rubric},
    Result,
};

/// Handle the week command
pub fn handle_week(date: NaiveDate) -> Week {
    let week = calc_week(date);
    println!("{} → week {}", date.format("%Y-%m-%d"), week);
    week
}

/// Handle the rubric command
pub fn handle_rubric(rubric: &Rubric, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(rubric)?);
        return Ok(());
    }

    for item in rubric.items() {
        println!("{:<28} {:>+4}  {}", item.key, item.weight, item.label);
    }
    Ok(())
}
