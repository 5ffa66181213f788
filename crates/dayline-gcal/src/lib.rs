//! Google Calendar event source for dayline.
//!
//! Provides:
//! - A read-only `events.list` client with pagination
//! - The OAuth installed-app flow and a JSON token file
//! - Mapping from API event resources to core events

mod auth;
mod payload;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

pub use auth::{CALENDAR_READONLY_SCOPE, OAuthApp, OAuthClient, StoredToken, TokenStore};
pub use payload::{ApiEvent, ApiTime, parse_events_json, to_calendar_events};

use payload::EventsPage;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars/";
const MAX_RESULTS: &str = "2500";

/// Calendar source errors.
#[derive(Debug, Error)]
pub enum GcalError {
    /// An OAuth credential is not configured.
    #[error("missing OAuth credential: {field}")]
    MissingCredentials { field: &'static str },
    /// The calendar id is empty or unusable in a URL.
    #[error("invalid calendar id: {id:?}")]
    InvalidCalendarId { id: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// No usable credentials; the user has to authorize again.
    #[error("authorization required: {reason}")]
    AuthRequired { reason: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Token file could not be read or written.
    #[error("token file {}: {source}", path.display())]
    TokenIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Token file is not valid JSON.
    #[error("token file {} is malformed: {source}", path.display())]
    TokenFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl GcalError {
    /// Whether re-running the authorization flow would fix this error.
    pub const fn needs_authorization(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired { .. } | Self::Api { status: 401, .. }
        )
    }
}

/// Google Calendar API client for one calendar.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    calendar_id: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("calendar_id", &self.calendar_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for `calendar_id` (`primary` for the user's own).
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar id is blank, or if the HTTP client
    /// fails to build.
    pub fn new(calendar_id: impl Into<String>) -> Result<Self, GcalError> {
        let calendar_id = calendar_id.into();
        if calendar_id.trim().is_empty() {
            return Err(GcalError::InvalidCalendarId { id: calendar_id });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(GcalError::ClientBuild)?;

        Ok(Self { http, calendar_id })
    }

    fn events_url(&self) -> Result<Url, GcalError> {
        let invalid = || GcalError::InvalidCalendarId {
            id: self.calendar_id.clone(),
        };
        let mut url = Url::parse(CALENDAR_API_BASE).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .push(&self.calendar_id)
            .push("events");
        Ok(url)
    }

    /// Lists events overlapping `[start, end)`, expanding recurring events
    /// and following every page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or cannot be parsed.
    pub async fn list_events(
        &self,
        access_token: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ApiEvent>, GcalError> {
        let url = self.events_url()?;
        let time_min = start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let time_max = end.to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", MAX_RESULTS),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let response = self
                .http
                .get(url.clone())
                .bearer_auth(access_token)
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(parse_api_error(status, &body));
            }

            let page: EventsPage = serde_json::from_str(&body)
                .map_err(|err| GcalError::InvalidResponse(err.to_string()))?;
            events.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            calendar = %self.calendar_id,
            count = events.len(),
            "fetched calendar events"
        );
        Ok(events)
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> GcalError {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    let message = serde_json::from_str::<ErrorPayload>(body)
        .map_or_else(|_| format!("status {status}: {body}"), |payload| payload.error.message);
    GcalError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Fetches events with a stored token, refreshing it when it is about to
/// expire and once more if the API rejects it.
#[derive(Debug, Clone)]
pub struct CalendarSource {
    client: Client,
    oauth: OAuthClient,
    store: TokenStore,
}

impl CalendarSource {
    pub const fn new(client: Client, oauth: OAuthClient, store: TokenStore) -> Self {
        Self {
            client,
            oauth,
            store,
        }
    }

    /// Lists events overlapping `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`GcalError::AuthRequired`] if no token is stored or it cannot
    /// be refreshed, or any request error.
    pub async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ApiEvent>, GcalError> {
        let mut token = self.store.load()?.ok_or_else(|| GcalError::AuthRequired {
            reason: format!("no token at {}", self.store.path().display()),
        })?;

        if token.is_expiring(Utc::now()) {
            token = self.refresh(&token).await?;
        }

        match self.client.list_events(&token.access_token, start, end).await {
            Err(GcalError::Api { status: 401, .. }) => {
                tracing::info!("access token rejected, refreshing");
                let token = self.refresh(&token).await?;
                self.client
                    .list_events(&token.access_token, start, end)
                    .await
            }
            result => result,
        }
    }

    async fn refresh(&self, token: &StoredToken) -> Result<StoredToken, GcalError> {
        let fresh = self.oauth.refresh(token).await?;
        self.store.save(&fresh)?;
        Ok(fresh)
    }
}
