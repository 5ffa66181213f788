//! OAuth 2.0 installed-app flow and the on-disk token.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::GcalError;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only access to calendar events.
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN: TimeDelta = TimeDelta::seconds(60);

/// Registered OAuth client credentials.
#[derive(Clone)]
pub struct OAuthApp {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl fmt::Debug for OAuthApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthApp")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl OAuthApp {
    /// Builds the app from configured credentials.
    ///
    /// # Errors
    ///
    /// Returns [`GcalError::MissingCredentials`] when the id or secret is
    /// absent or blank.
    pub fn new(
        client_id: Option<&str>,
        client_secret: Option<&str>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, GcalError> {
        let required = |value: Option<&str>, field: &'static str| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or(GcalError::MissingCredentials { field })
        };
        Ok(Self {
            client_id: required(client_id, "client_id")?,
            client_secret: required(client_secret, "client_secret")?,
            redirect_uri: redirect_uri.into(),
        })
    }

    /// Consent page URL. `state` is echoed back on the redirect.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built.
    pub fn authorization_url(&self, state: &str) -> Result<Url, GcalError> {
        Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", CALENDAR_READONLY_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|err| GcalError::InvalidResponse(format!("authorization URL: {err}")))
    }
}

/// Token endpoint client.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    app: OAuthApp,
}

#[derive(Debug, Deserialize)]
struct TokenResponsePayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl OAuthClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(app: OAuthApp) -> Result<Self, GcalError> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_TIMEOUT)
            .build()
            .map_err(GcalError::ClientBuild)?;
        Ok(Self { http, app })
    }

    /// Trades an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the endpoint rejects the code.
    pub async fn exchange_code(&self, code: &str) -> Result<StoredToken, GcalError> {
        let payload = self
            .post_form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.app.client_id.as_str()),
                ("client_secret", self.app.client_secret.as_str()),
                ("redirect_uri", self.app.redirect_uri.as_str()),
                ("code", code.trim()),
            ])
            .await?;
        StoredToken::from_payload(payload, None, Utc::now())
    }

    /// Gets a fresh access token. The refresh token is carried over when the
    /// endpoint does not issue a new one.
    ///
    /// # Errors
    ///
    /// Returns [`GcalError::AuthRequired`] if the token has no refresh token
    /// or the grant was revoked.
    pub async fn refresh(&self, token: &StoredToken) -> Result<StoredToken, GcalError> {
        let Some(refresh_token) = token.refresh_token.as_deref() else {
            return Err(GcalError::AuthRequired {
                reason: "stored token has no refresh token".to_string(),
            });
        };
        let payload = self
            .post_form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.app.client_id.as_str()),
                ("client_secret", self.app.client_secret.as_str()),
                ("refresh_token", refresh_token),
            ])
            .await?;
        tracing::debug!("refreshed access token");
        StoredToken::from_payload(payload, Some(refresh_token), Utc::now())
    }

    async fn post_form(&self, params: &[(&str, &str)]) -> Result<TokenResponsePayload, GcalError> {
        let response = self.http.post(TOKEN_ENDPOINT).form(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let payload: TokenResponsePayload = serde_json::from_str(&body)
            .map_err(|err| GcalError::InvalidResponse(format!("token response: {err}")))?;

        if let Some(code) = payload.error.as_deref() {
            let detail = payload.error_description.as_deref().unwrap_or(code);
            if code == "invalid_grant" {
                return Err(GcalError::AuthRequired {
                    reason: format!("grant rejected: {detail}"),
                });
            }
            return Err(GcalError::Api {
                status: status.as_u16(),
                message: format!("token endpoint error {code}: {detail}"),
            });
        }
        if !status.is_success() {
            return Err(GcalError::Api {
                status: status.as_u16(),
                message: format!("token endpoint returned {status}"),
            });
        }
        Ok(payload)
    }
}

/// Tokens persisted between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl StoredToken {
    fn from_payload(
        payload: TokenResponsePayload,
        previous_refresh: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, GcalError> {
        let access_token = payload
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                GcalError::InvalidResponse("token response has no access_token".to_string())
            })?;
        Ok(Self {
            access_token,
            refresh_token: payload
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at: payload
                .expires_in
                .map(|secs| now + TimeDelta::seconds(secs.max(0))),
            scope: payload.scope,
            token_type: payload.token_type,
        })
    }

    /// Whether the access token is expired or about to be.
    pub fn is_expiring(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - REFRESH_MARGIN <= now)
    }
}

/// JSON token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the token, or `None` if no token has been saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StoredToken>, GcalError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(GcalError::TokenIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| GcalError::TokenFormat {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes the token, creating parent directories. On Unix the file is
    /// readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, token: &StoredToken) -> Result<(), GcalError> {
        let io_err = |source| GcalError::TokenIo {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(token).map_err(|source| GcalError::TokenFormat {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
        Ok(())
    }

    /// Removes the token file. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), GcalError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(GcalError::TokenIo {
                path: self.path.clone(),
                source: err,
            }),
            _ => Ok(()),
        }
    }
}
