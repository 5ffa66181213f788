//! Google Calendar authorization: consent URL, code exchange, token status.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use dayline_gcal::{OAuthApp, OAuthClient, TokenStore};
use uuid::Uuid;

use crate::Config;

/// Builds the OAuth app from configured credentials.
pub(crate) fn oauth_app(config: &Config) -> Result<OAuthApp> {
    OAuthApp::new(
        config.client_id.as_deref(),
        config.client_secret.as_deref(),
        config.redirect_uri.clone(),
    )
    .context("OAuth client is not configured (set client_id and client_secret in config.toml or DAYLINE_CLIENT_ID / DAYLINE_CLIENT_SECRET)")
}

/// Prints the consent URL.
pub fn url<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let app = oauth_app(config)?;
    let state = Uuid::new_v4().to_string();
    let url = app.authorization_url(&state)?;
    tracing::debug!(%state, "generated authorization state");

    writeln!(writer, "Open this URL to authorize dayline:")?;
    writeln!(writer, "{url}")?;
    writeln!(
        writer,
        "Then run `dayline auth login <CODE>` with the code from the redirect."
    )?;
    Ok(())
}

/// Exchanges an authorization code and stores the token.
pub fn login<W: Write>(writer: &mut W, config: &Config, code: &str) -> Result<()> {
    let client = OAuthClient::new(oauth_app(config)?).context("failed to create OAuth client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let token = runtime
        .block_on(client.exchange_code(code))
        .context("failed to exchange authorization code")?;

    if token.refresh_token.is_none() {
        tracing::warn!("no refresh token issued; re-authorize when the access token expires");
    }

    let store = TokenStore::new(&config.token_path);
    store
        .save(&token)
        .context("failed to save token")?;
    tracing::info!(path = %store.path().display(), "saved token");
    writeln!(writer, "Saved token to {}", store.path().display())?;
    Ok(())
}

/// Reports the stored token.
pub fn status<W: Write>(writer: &mut W, config: &Config, now: DateTime<Utc>) -> Result<()> {
    let store = TokenStore::new(&config.token_path);
    let Some(token) = store.load().context("failed to read token")? else {
        writeln!(writer, "No token stored at {}", store.path().display())?;
        writeln!(writer, "Run `dayline auth url` to authorize.")?;
        return Ok(());
    };

    writeln!(writer, "Token: {}", store.path().display())?;
    writeln!(
        writer,
        "Refresh token: {}",
        if token.refresh_token.is_some() { "yes" } else { "no" }
    )?;
    match token.expires_at {
        Some(expires_at) => {
            let local = expires_at.with_timezone(&Local).format("%Y-%m-%d %I:%M %p");
            let state = if token.is_expiring(now) {
                "expired"
            } else {
                "valid"
            };
            writeln!(writer, "Access token: {state} (expires {local})")?;
        }
        None => writeln!(writer, "Access token: no expiry recorded")?,
    }
    Ok(())
}
