//! Calendar events as consumed by the day resolver.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::clock;

/// Synthetic markers placed at the edges of a custom day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMarker {
    /// End of the night's sleep; first line of the day.
    WakeUp,
    /// Onset of the next sleep; last line of the day.
    Sleep,
}

impl BoundaryMarker {
    /// Reserved display title for this marker.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::WakeUp => "Wake Up",
            Self::Sleep => "Sleep",
        }
    }
}

/// A single calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// Event title.
    pub summary: String,
    /// Start instant. All-day events start at local midnight.
    pub start: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
    /// Calendar color id, if the event overrides the calendar default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    /// Whether the source event had date-only granularity.
    pub all_day: bool,
    /// Set only on markers created by the day filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<BoundaryMarker>,
}

impl CalendarEvent {
    /// Creates a timed event.
    pub fn timed(summary: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
            color_id: None,
            all_day: false,
            marker: None,
        }
    }

    /// Creates an all-day event spanning `[start_date, end_date)` in `tz`.
    pub fn all_day<Tz: TimeZone>(
        summary: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        tz: &Tz,
    ) -> Self {
        Self {
            summary: summary.into(),
            start: clock::local_midnight(start_date, tz),
            end: clock::local_midnight(end_date, tz),
            color_id: None,
            all_day: true,
            marker: None,
        }
    }

    /// Creates a zero-length boundary marker at `at`.
    pub fn marker(kind: BoundaryMarker, at: DateTime<Utc>) -> Self {
        Self {
            summary: kind.title().to_string(),
            start: at,
            end: at,
            color_id: None,
            all_day: false,
            marker: Some(kind),
        }
    }

    /// Builds an event from source start/end times.
    ///
    /// Either time may be missing in source data; that is reported as
    /// [`MalformedEvent::MissingTime`] instead of being guessed.
    pub fn from_times<Tz: TimeZone>(
        summary: impl Into<String>,
        start: Option<EventTime>,
        end: Option<EventTime>,
        tz: &Tz,
    ) -> Result<Self, MalformedEvent> {
        let summary = summary.into();
        let Some(start) = start else {
            return Err(MalformedEvent::MissingTime {
                summary,
                field: "start",
            });
        };
        let Some(end) = end else {
            return Err(MalformedEvent::MissingTime {
                summary,
                field: "end",
            });
        };

        Ok(Self {
            summary,
            all_day: start.is_date_only(),
            start: start.instant(tz),
            end: end.instant(tz),
            color_id: None,
            marker: None,
        })
    }

    /// Sets the color id.
    #[must_use]
    pub fn with_color(mut self, color_id: impl Into<String>) -> Self {
        self.color_id = Some(color_id.into());
        self
    }

    /// Whether this event is a synthetic "Wake Up"/"Sleep" marker.
    pub const fn is_boundary_marker(&self) -> bool {
        self.marker.is_some()
    }
}

/// A start or end time as it appears in calendar data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// A precise instant (`dateTime`).
    At(DateTime<FixedOffset>),
    /// A calendar date with no time of day (`date`).
    Date(NaiveDate),
}

impl EventTime {
    /// Whether the time has date-only granularity.
    pub const fn is_date_only(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// The instant this time denotes; dates map to local midnight in `tz`.
    pub fn instant<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            Self::At(dt) => dt.with_timezone(&Utc),
            Self::Date(date) => clock::local_midnight(*date, tz),
        }
    }
}

/// An event whose times cannot be determined.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedEvent {
    /// Neither `dateTime` nor `date` was present.
    #[error("event {summary:?} has no {field} time")]
    MissingTime {
        summary: String,
        field: &'static str,
    },

    /// A time was present but could not be parsed.
    #[error("event {summary:?} has an unparseable {field} time: {value}")]
    InvalidTime {
        summary: String,
        field: &'static str,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_times_rejects_missing_start() {
        let end = EventTime::Date(NaiveDate::from_ymd_opt(2024, 10, 23).unwrap());
        let err = CalendarEvent::from_times("Focus", None, Some(end), &Utc).unwrap_err();
        assert_eq!(
            err,
            MalformedEvent::MissingTime {
                summary: "Focus".to_string(),
                field: "start",
            }
        );
        assert_eq!(err.to_string(), r#"event "Focus" has no start time"#);
    }

    #[test]
    fn from_times_marks_date_only_events_all_day() {
        let start = EventTime::Date(NaiveDate::from_ymd_opt(2024, 10, 22).unwrap());
        let end = EventTime::Date(NaiveDate::from_ymd_opt(2024, 10, 23).unwrap());
        let event = CalendarEvent::from_times("Holiday", Some(start), Some(end), &Utc).unwrap();
        assert!(event.all_day);
        assert_eq!(event.start.to_rfc3339(), "2024-10-22T00:00:00+00:00");
        assert_eq!(event.end.to_rfc3339(), "2024-10-23T00:00:00+00:00");
    }

    #[test]
    fn from_times_keeps_instants() {
        let start = DateTime::parse_from_rfc3339("2024-10-22T09:00:00-07:00").unwrap();
        let end = DateTime::parse_from_rfc3339("2024-10-22T10:00:00-07:00").unwrap();
        let event = CalendarEvent::from_times(
            "Standup",
            Some(EventTime::At(start)),
            Some(EventTime::At(end)),
            &Utc,
        )
        .unwrap();
        assert!(!event.all_day);
        assert_eq!(event.start.to_rfc3339(), "2024-10-22T16:00:00+00:00");
    }

    #[test]
    fn markers_are_zero_length_and_titled() {
        let at = Utc.with_ymd_and_hms(2024, 10, 22, 9, 0, 0).unwrap();
        let wake = CalendarEvent::marker(BoundaryMarker::WakeUp, at);
        assert_eq!(wake.summary, "Wake Up");
        assert_eq!(wake.start, wake.end);
        assert!(wake.is_boundary_marker());
        assert!(!CalendarEvent::timed("Gym", at, at).is_boundary_marker());
    }
}
