//! dayline CLI library.
//!
//! This crate provides the command-line interface: argument parsing,
//! configuration, and the `day`, `window`, and `auth` commands.

mod cli;
pub mod commands;
mod config;

pub use cli::{AuthAction, Cli, Commands};
pub use config::Config;
