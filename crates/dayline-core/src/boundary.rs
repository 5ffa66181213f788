//! Sleep-anchored day boundaries.
//!
//! A custom day starts when the first real sleep session ending on the target
//! date ends, and stops when the next sleep session begins. Short naps and
//! early-afternoon rests are ignored so they cannot split a day.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::classify::{duration_hours, is_sleep_tagged};
use crate::clock::{local_date, local_instant, local_midnight};
use crate::event::CalendarEvent;

/// Sleep sessions at or below this length never start a day.
pub const NAP_THRESHOLD_HOURS: f64 = 2.0;

/// Hour of the following day at which a day without a sleep onset ends.
pub const DEFAULT_END_HOUR: u32 = 5;

/// Sleep onsets on the target date only end the day from this hour on.
pub const EVENING_CUTOFF_HOUR: u32 = 18;

/// The `[start, end)` interval of one custom day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// A window whose start is not before its end.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("day window must start before it ends (start {start}, end {end})")]
pub struct InvalidWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Creates a window, rejecting empty or inverted intervals.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidWindow> {
        if start >= end {
            return Err(InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the day.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Resolves the custom day for `date` from the candidate events.
///
/// `events` should cover [`fetch_range`] so that the previous night and the
/// following night are both visible.
pub fn resolve<Tz: TimeZone>(date: NaiveDate, events: &[CalendarEvent], tz: &Tz) -> DayWindow {
    let start = day_start(date, events, tz);
    let end = day_end(date, start, events, tz);
    debug_assert!(start < end, "resolved window is empty");
    tracing::debug!(%date, %start, %end, "resolved day window");
    DayWindow { start, end }
}

/// When the day starts: the earliest end of a sleep session longer than
/// [`NAP_THRESHOLD_HOURS`] that ends on `date`, or local midnight.
pub fn day_start<Tz: TimeZone>(date: NaiveDate, events: &[CalendarEvent], tz: &Tz) -> DateTime<Utc> {
    let wake = events
        .iter()
        .filter(|event| is_sleep_tagged(event))
        .filter(|event| duration_hours(event) > NAP_THRESHOLD_HOURS)
        .filter(|event| local_date(event.end, tz) == date)
        .min_by_key(|event| event.end);

    match wake {
        Some(event) => {
            tracing::debug!(summary = %event.summary, end = %event.end, "day starts after sleep");
            event.end
        }
        None => local_midnight(date, tz),
    }
}

/// When the day ends: the earliest sleep onset after `start` that begins in
/// the evening of `date` or on the following day, or 05:00 the next morning.
pub fn day_end<Tz: TimeZone>(
    date: NaiveDate,
    start: DateTime<Utc>,
    events: &[CalendarEvent],
    tz: &Tz,
) -> DateTime<Utc> {
    let next_day = date + Duration::days(1);
    let evening_cutoff = local_instant(date, EVENING_CUTOFF_HOUR, tz);

    let onset = events
        .iter()
        .filter(|event| is_sleep_tagged(event))
        .filter(|event| event.start > start)
        .filter(|event| {
            let onset_date = local_date(event.start, tz);
            (onset_date == date && event.start >= evening_cutoff) || onset_date == next_day
        })
        .min_by_key(|event| event.start);

    match onset {
        Some(event) => {
            tracing::debug!(summary = %event.summary, start = %event.start, "day ends at sleep");
            event.start
        }
        None => local_instant(next_day, DEFAULT_END_HOUR, tz),
    }
}

/// The range an event source must cover to resolve `date`: midnight of the
/// previous day through the last millisecond two days after `date`.
pub fn fetch_range<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(date - Duration::days(1), tz);
    let end = local_midnight(date + Duration::days(3), tz) - Duration::milliseconds(1);
    (start, end)
}
