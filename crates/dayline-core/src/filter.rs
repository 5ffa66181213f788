//! Selecting the events that belong to a custom day.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::boundary::{self, DayWindow};
use crate::classify::{is_all_day, is_sleep_tagged, overlaps};
use crate::event::{BoundaryMarker, CalendarEvent};

/// A resolved day: its window and the ordered events to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub window: DayWindow,
    /// "Wake Up" marker, the day's events by start time, "Sleep" marker.
    pub events: Vec<CalendarEvent>,
}

/// Resolves the window for `date` and selects its events.
pub fn plan_day<Tz: TimeZone>(date: NaiveDate, events: &[CalendarEvent], tz: &Tz) -> DayPlan {
    let window = boundary::resolve(date, events, tz);
    let events = select_day_events(date, &window, events);
    DayPlan {
        date,
        window,
        events,
    }
}

/// Picks the events inside `window` and frames them with boundary markers.
///
/// All-day events, untitled events, and raw sleep sessions are dropped; the
/// markers stand in for the sleep sessions that bound the day.
pub fn select_day_events(
    date: NaiveDate,
    window: &DayWindow,
    events: &[CalendarEvent],
) -> Vec<CalendarEvent> {
    let mut kept: Vec<CalendarEvent> = events
        .iter()
        .filter(|event| !is_all_day(event))
        .filter(|event| !event.summary.trim().is_empty())
        .filter(|event| overlaps(event, window))
        .filter(|event| event.is_boundary_marker() || !is_sleep_tagged(event))
        .cloned()
        .collect();
    kept.sort_by_key(|event| event.start);

    tracing::debug!(
        %date,
        candidates = events.len(),
        kept = kept.len(),
        "selected day events"
    );

    let mut selected = Vec::with_capacity(kept.len() + 2);
    selected.push(CalendarEvent::marker(BoundaryMarker::WakeUp, window.start()));
    selected.extend(kept);
    selected.push(CalendarEvent::marker(BoundaryMarker::Sleep, window.end()));
    selected
}
