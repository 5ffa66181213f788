//! Window command: show where a custom day starts and ends.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use dayline_core::{DayWindow, resolve};
use serde::Serialize;

use crate::Config;
use crate::commands::events;
use crate::commands::util::{format_duration, parse_date};

#[derive(Debug, Args)]
pub struct WindowArgs {
    /// Target date (YYYY-MM-DD). Defaults to today.
    pub date: Option<String>,

    /// Read events from a saved `events.list` JSON file instead of the API.
    #[arg(long, value_name = "PATH")]
    pub events_json: Option<PathBuf>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct WindowJson<'a> {
    date: NaiveDate,
    timezone: &'a str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration_minutes: i64,
}

pub fn run<W: Write>(writer: &mut W, args: &WindowArgs, config: &Config) -> Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let events = events::load_for_day(config, args.events_json.as_deref(), date)?;
    let window = resolve(date, &events, &Local);

    if args.json {
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "local".to_string());
        writeln!(writer, "{}", format_window_json(date, &window, &timezone)?)?;
    } else {
        write!(writer, "{}", format_window(date, &window, &Local))?;
    }
    Ok(())
}

fn format_window_json(date: NaiveDate, window: &DayWindow, timezone: &str) -> Result<String> {
    let output = WindowJson {
        date,
        timezone,
        start: window.start(),
        end: window.end(),
        duration_minutes: window.duration().num_minutes(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn format_window<Tz: TimeZone>(date: NaiveDate, window: &DayWindow, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = |instant: DateTime<Utc>| {
        instant
            .with_timezone(tz)
            .format("%a %Y-%m-%d %I:%M %p")
            .to_string()
    };
    format!(
        "Day {date}\n  Start:  {}\n  End:    {}\n  Length: {}\n",
        local(window.start()),
        local(window.end()),
        format_duration(window.duration().num_minutes())
    )
}
