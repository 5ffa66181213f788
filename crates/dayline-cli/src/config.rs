//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use dayline_core::{MergeStrategy, Theme};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Calendar to read; `primary` is the account's own calendar.
    pub calendar_id: String,
    /// OAuth client id of the registered desktop app.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Redirect URI registered for the OAuth client.
    pub redirect_uri: String,
    /// Where the OAuth token is stored.
    pub token_path: PathBuf,
    /// Optional debug log file.
    pub log_path: Option<PathBuf>,
    /// Swatch palette.
    pub theme: Theme,
    /// How new lines are merged into a note.
    pub merge_strategy: MergeStrategy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("calendar_id", &self.calendar_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .field("token_path", &self.token_path)
            .field("log_path", &self.log_path)
            .field("theme", &self.theme)
            .field("merge_strategy", &self.merge_strategy)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            calendar_id: "primary".to_string(),
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:3000/oauth2callback".to_string(),
            token_path: data_dir.join("token.json"),
            log_path: None,
            theme: Theme::default(),
            merge_strategy: MergeStrategy::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (DAYLINE_*)
        figment = figment.merge(Env::prefixed("DAYLINE_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for dayline.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dayline"))
}

/// Returns the platform-specific data directory for dayline.
///
/// On Linux: `~/.local/share/dayline`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("dayline"))
}
