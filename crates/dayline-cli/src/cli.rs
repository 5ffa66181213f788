//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::day::DayArgs;
use crate::commands::window::WindowArgs;

/// Sleep-anchored daily calendar digest.
///
/// Resolves a "day" from waking up to going to sleep using calendar sleep
/// events, then renders that day's events into a markdown note.
#[derive(Debug, Parser)]
#[command(name = "dayline", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a day's events, or reconcile them into a note.
    Day(DayArgs),

    /// Show the resolved window for a day.
    Window(WindowArgs),

    /// Manage Google Calendar authorization.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

/// Authorization steps.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Print the consent URL to open in a browser.
    Url,

    /// Exchange the code from the consent redirect and save the token.
    Login {
        /// The `code` query parameter from the redirect URL.
        code: String,
    },

    /// Show whether a token is stored and when it expires.
    Status,
}
