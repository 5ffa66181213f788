//! Predicates over single events.

use crate::boundary::DayWindow;
use crate::event::CalendarEvent;

/// Whether the event came from a date-only (all-day) entry.
pub const fn is_all_day(event: &CalendarEvent) -> bool {
    event.all_day
}

/// Whether the event's title mentions sleep, in any case.
pub fn is_sleep_tagged(event: &CalendarEvent) -> bool {
    event.summary.to_lowercase().contains("sleep")
}

/// Event length in fractional hours.
#[allow(clippy::cast_precision_loss)]
pub fn duration_hours(event: &CalendarEvent) -> f64 {
    (event.end - event.start).num_milliseconds() as f64 / 3_600_000.0
}

/// Whether the event belongs to `window`.
///
/// True when the event starts inside `[start, end)`, ends inside
/// `(start, end]`, or spans the whole window. For events with positive length
/// this is ordinary half-open overlap; a zero-length event counts anywhere in
/// the closed window, edges included.
pub fn overlaps(event: &CalendarEvent, window: &DayWindow) -> bool {
    let starts_inside = event.start >= window.start() && event.start < window.end();
    let ends_inside = event.end > window.start() && event.end <= window.end();
    let spans = event.start < window.start() && event.end > window.end();
    starts_inside || ends_inside || spans
}
