//! Markdown event lines and their recognizer.
//!
//! A rendered line looks like
//! `09:15 AM - <span style="..."></span> **Standup**`. The recognizer accepts
//! exactly the lines the renderer produces (and hand-edited variants with
//! different spacing or swatch styles), which is what lets the reconciler find
//! its own output on the next run.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;

use crate::event::CalendarEvent;
use crate::types::{EventColor, Theme};

/// Title used for events without a usable summary.
pub const UNTITLED: &str = "Untitled Event";

static EVENT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\d{1,2}:\d{2}\s*[AP]M)\s*-\s*<span style="display: inline-block;[^>]*></span>\s*\*\*(.+?)\*\*"#,
    )
    .expect("event line pattern is valid")
});

/// The parts of a recognized event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventLine<'a> {
    pub time: &'a str,
    pub title: &'a str,
}

/// Matches a document line against the event-line pattern.
pub fn recognize(line: &str) -> Option<EventLine<'_>> {
    let caps = EVENT_LINE_RE.captures(line)?;
    Some(EventLine {
        time: caps.get(1)?.as_str(),
        title: caps.get(2)?.as_str(),
    })
}

/// Whether a line is an event line.
pub fn is_event_line(line: &str) -> bool {
    EVENT_LINE_RE.is_match(line)
}

/// Renders events as markdown lines in a given time zone and theme.
#[derive(Debug, Clone)]
pub struct Renderer<Tz: TimeZone> {
    tz: Tz,
    theme: Theme,
}

impl<Tz: TimeZone> Renderer<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    pub const fn new(tz: Tz, theme: Theme) -> Self {
        Self { tz, theme }
    }

    /// Renders one event line.
    pub fn line(&self, event: &CalendarEvent) -> String {
        let hex = if event.is_boundary_marker() {
            self.theme.boundary_hex()
        } else {
            self.theme
                .hex(EventColor::from_id_or_default(event.color_id.as_deref()))
        };
        format!(
            "{} - {} **{}**",
            self.time(event.start),
            swatch(hex),
            display_title(&event.summary)
        )
    }

    /// Renders every event, in order.
    pub fn lines(&self, events: &[CalendarEvent]) -> Vec<String> {
        events.iter().map(|event| self.line(event)).collect()
    }

    /// 12-hour clock time with a zero-padded hour, e.g. `09:05 PM`.
    pub fn time(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.tz).format("%I:%M %p").to_string()
    }
}

/// Inline color square in front of the title.
pub fn swatch(hex: &str) -> String {
    format!(
        r#"<span style="display: inline-block; width: 12px; height: 12px; background-color: {hex}; border-radius: 2px; margin-right: 6px; vertical-align: middle;"></span>"#
    )
}

/// Flattens a summary to a single non-empty line.
fn display_title(summary: &str) -> String {
    let flattened = summary.replace(['\r', '\n'], " ");
    let trimmed = flattened.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::BoundaryMarker;
    use chrono::FixedOffset;
    use insta::assert_snapshot;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 22, hour, minute, 0).unwrap()
    }

    #[test]
    fn renders_event_line() {
        let renderer = Renderer::new(Utc, Theme::Classic);
        let event = CalendarEvent::timed("Standup", at(9, 15), at(9, 30)).with_color("5");
        assert_snapshot!(
            renderer.line(&event),
            @r#"09:15 AM - <span style="display: inline-block; width: 12px; height: 12px; background-color: #fbd75b; border-radius: 2px; margin-right: 6px; vertical-align: middle;"></span> **Standup**"#
        );
    }

    #[test]
    fn markers_use_boundary_color() {
        let renderer = Renderer::new(Utc, Theme::Dark);
        let marker = CalendarEvent::marker(BoundaryMarker::Sleep, at(23, 45));
        let line = renderer.line(&marker);
        assert!(line.starts_with("11:45 PM - "));
        assert!(line.contains("background-color: #7c7c7c;"));
        assert!(line.ends_with("**Sleep**"));
    }

    #[test]
    fn unknown_color_falls_back_to_lavender() {
        let renderer = Renderer::new(Utc, Theme::Dark);
        let event = CalendarEvent::timed("Read", at(20, 0), at(21, 0)).with_color("99");
        assert!(renderer.line(&event).contains("background-color: #828bc2;"));
    }

    #[test]
    fn time_uses_renderer_zone() {
        let tz = FixedOffset::west_opt(7 * 3600).unwrap();
        let renderer = Renderer::new(tz, Theme::Dark);
        assert_eq!(renderer.time(at(16, 5)), "09:05 AM");
        assert_eq!(renderer.time(at(7, 0)), "12:00 AM");
        assert_eq!(renderer.time(at(19, 0)), "12:00 PM");
    }

    #[test]
    fn titles_are_flattened_and_never_empty() {
        let renderer = Renderer::new(Utc, Theme::Dark);
        let multiline = CalendarEvent::timed("Plan\nweek ", at(8, 0), at(9, 0));
        assert!(renderer.line(&multiline).ends_with("**Plan week**"));
        let blank = CalendarEvent::timed("  ", at(8, 0), at(9, 0));
        assert!(renderer.line(&blank).ends_with("**Untitled Event**"));
    }

    #[test]
    fn rendered_lines_are_recognized() {
        let renderer = Renderer::new(Utc, Theme::Classic);
        let event = CalendarEvent::timed("Call Mom - weekly", at(21, 0), at(22, 0));
        let line = renderer.line(&event);
        let parsed = recognize(&line).unwrap();
        assert_eq!(parsed.time, "09:00 PM");
        assert_eq!(parsed.title, "Call Mom - weekly");
    }

    #[test]
    fn recognizer_accepts_unpadded_hours_and_loose_spacing() {
        let line = r#"9:00 AM -  <span style="display: inline-block; width: 10px;"></span>**Gym**"#;
        let parsed = recognize(line).unwrap();
        assert_eq!(parsed.time, "9:00 AM");
        assert_eq!(parsed.title, "Gym");
    }

    #[test]
    fn recognizer_rejects_other_lines() {
        for line in [
            "",
            "## Events",
            "09:00 AM - **No swatch**",
            "- [ ] 09:00 AM - task",
            r#"  09:00 AM - <span style="display: inline-block;"></span> **Indented**"#,
            r#"09:00 AM - <span style="display: inline-block;"></span> ****"#,
        ] {
            assert!(!is_event_line(line), "{line:?} should not match");
        }
    }
}
