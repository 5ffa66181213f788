//! Shared utilities for CLI commands.

use anyhow::Context;
use chrono::{Days, Local, NaiveDate};

/// Parses a target date as `YYYY-MM-DD`, defaulting to today's local date.
pub fn parse_date(value: Option<&str>) -> anyhow::Result<NaiveDate> {
    let Some(value) = value else {
        return Ok(Local::now().date_naive());
    };
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date: {value}. Use YYYY-MM-DD (e.g., 2024-10-22)"))?;

    // Resolution looks one day back and three days ahead.
    if date.checked_sub_days(Days::new(1)).is_none()
        || date.checked_add_days(Days::new(3)).is_none()
    {
        anyhow::bail!("invalid date: {value} is outside the supported calendar range");
    }
    Ok(date)
}

/// Formats a duration in minutes as `14h 05m`.
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
