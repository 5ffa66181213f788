//! Loading the candidate events for a target date.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use dayline_core::{CalendarEvent, fetch_range};
use dayline_gcal::{CalendarSource, Client, OAuthClient, TokenStore};

use crate::Config;
use crate::commands::auth::oauth_app;

/// Loads events around `date`, from a saved JSON file when given, otherwise
/// from the configured Google calendar.
pub fn load_for_day(
    config: &Config,
    events_json: Option<&Path>,
    date: NaiveDate,
) -> Result<Vec<CalendarEvent>> {
    let raw = match events_json {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            dayline_gcal::parse_events_json(&text)
                .with_context(|| format!("failed to parse events from {}", path.display()))?
        }
        None => fetch(config, date)?,
    };

    let events = dayline_gcal::to_calendar_events(&raw, &Local);
    tracing::debug!(
        fetched = raw.len(),
        usable = events.len(),
        "loaded candidate events"
    );
    Ok(events)
}

fn fetch(config: &Config, date: NaiveDate) -> Result<Vec<dayline_gcal::ApiEvent>> {
    let (start, end) = fetch_range(date, &Local);
    tracing::debug!(%start, %end, calendar = %config.calendar_id, "fetching events");

    let app = oauth_app(config)?;
    let client = Client::new(config.calendar_id.clone()).context("failed to create calendar client")?;
    let oauth = OAuthClient::new(app).context("failed to create OAuth client")?;
    let source = CalendarSource::new(client, oauth, TokenStore::new(&config.token_path));

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime
        .block_on(source.events_between(start, end))
        .map_err(|err| {
            let hint = err.needs_authorization();
            let err = anyhow::Error::new(err);
            if hint {
                err.context("calendar authorization required; run `dayline auth url`")
            } else {
                err.context("failed to fetch calendar events")
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_events_from_json_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("events.json");
        fs::write(
            &path,
            r#"{"items": [
                {"summary": "Gym", "start": {"dateTime": "2024-10-22T18:00:00Z"}, "end": {"dateTime": "2024-10-22T19:00:00Z"}},
                {"summary": "No times"}
            ]}"#,
        )
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        let events = load_for_day(&Config::default(), Some(&path), date).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Gym");
    }

    #[test]
    fn missing_json_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("missing.json");
        let date = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        let err = load_for_day(&Config::default(), Some(&path), date).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn fetch_without_credentials_fails_before_network() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        let err = load_for_day(&Config::default(), None, date).unwrap_err();
        assert!(format!("{err:#}").contains("client_id"));
    }
}
