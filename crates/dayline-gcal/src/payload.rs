//! Google Calendar event resources and their mapping to core events.

use chrono::{DateTime, NaiveDate, TimeZone};
use dayline_core::{CalendarEvent, EventTime, MalformedEvent};
use serde::Deserialize;

/// An event resource as returned by `events.list`.
///
/// Only the fields the day resolver needs are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<ApiTime>,
    #[serde(default)]
    pub end: Option<ApiTime>,
    #[serde(default)]
    pub color_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A start or end object: exactly one of `dateTime` or `date` is expected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTime {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl ApiTime {
    fn parse(&self, summary: &str, field: &'static str) -> Result<Option<EventTime>, MalformedEvent> {
        let invalid = |value: &str| MalformedEvent::InvalidTime {
            summary: summary.to_string(),
            field,
            value: value.to_string(),
        };

        if let Some(value) = self.date_time.as_deref() {
            return DateTime::parse_from_rfc3339(value)
                .map(|dt| Some(EventTime::At(dt)))
                .map_err(|_| invalid(value));
        }
        if let Some(value) = self.date.as_deref() {
            return NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|date| Some(EventTime::Date(date)))
                .map_err(|_| invalid(value));
        }
        Ok(None)
    }
}

impl ApiEvent {
    /// Whether the event was cancelled (only returned for recurring instances
    /// or when deleted events are requested).
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Converts to a core event, resolving date-only times in `tz`.
    pub fn to_calendar_event<Tz: TimeZone>(&self, tz: &Tz) -> Result<CalendarEvent, MalformedEvent> {
        let summary = self.summary.clone().unwrap_or_default();
        let start = match &self.start {
            Some(time) => time.parse(&summary, "start")?,
            None => None,
        };
        let end = match &self.end {
            Some(time) => time.parse(&summary, "end")?,
            None => None,
        };

        let event = CalendarEvent::from_times(summary, start, end, tz)?;
        Ok(match self.color_id.as_deref() {
            Some(color_id) => event.with_color(color_id),
            None => event,
        })
    }
}

/// One page of an `events.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventsPage {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventsPayload {
    Page(EventsPage),
    List(Vec<ApiEvent>),
}

/// Parses saved event data: either an `events.list` response body or a bare
/// array of event resources.
pub fn parse_events_json(text: &str) -> Result<Vec<ApiEvent>, serde_json::Error> {
    Ok(match serde_json::from_str::<EventsPayload>(text)? {
        EventsPayload::Page(page) => page.items,
        EventsPayload::List(items) => items,
    })
}

/// Converts resources to core events, skipping cancelled ones and logging and
/// skipping malformed ones.
pub fn to_calendar_events<Tz: TimeZone>(events: &[ApiEvent], tz: &Tz) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|event| !event.is_cancelled())
        .filter_map(|event| match event.to_calendar_event(tz) {
            Ok(converted) => Some(converted),
            Err(err) => {
                tracing::warn!(id = ?event.id, error = %err, "skipping malformed event");
                None
            }
        })
        .collect()
}
