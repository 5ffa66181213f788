//! CLI subcommand implementations.

pub mod auth;
pub mod day;
pub mod events;
pub mod util;
pub mod window;
