//! Day command: render a custom day's events or reconcile them into a note.
//!
//! Without `--file` the rendered lines are printed. With `--file` the note is
//! read, reconciled in memory, and written back in one go; the outcome is
//! reported as one of `SUCCESS:<stats>`, `NO_EXISTING_EVENTS`, or
//! `APPENDED:<n> events`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use dayline_core::{DayPlan, Document, MergeStrategy, Reconciliation, Renderer, plan_day};
use serde::Serialize;

use crate::Config;
use crate::commands::events;
use crate::commands::util::parse_date;

#[derive(Debug, Args)]
pub struct DayArgs {
    /// Target date (YYYY-MM-DD). Defaults to today.
    pub date: Option<String>,

    /// Markdown note to update in place.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Append the lines when the note has no event lines yet.
    #[arg(long, requires = "file")]
    pub append: bool,

    /// Print the resolved day as JSON.
    #[arg(long, conflicts_with = "file")]
    pub json: bool,

    /// Read events from a saved `events.list` JSON file instead of the API.
    #[arg(long, value_name = "PATH")]
    pub events_json: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DayJson<'a> {
    #[serde(flatten)]
    plan: &'a DayPlan,
    lines: &'a [String],
}

pub fn run<W: Write>(writer: &mut W, args: &DayArgs, config: &Config) -> Result<()> {
    let date = parse_date(args.date.as_deref())?;
    let events = events::load_for_day(config, args.events_json.as_deref(), date)?;
    let plan = plan_day(date, &events, &Local);
    let lines = Renderer::new(Local, config.theme).lines(&plan.events);
    tracing::info!(
        %date,
        start = %plan.window.start(),
        end = %plan.window.end(),
        events = plan.events.len(),
        "resolved day"
    );

    match &args.file {
        Some(path) => update_note(writer, path, &lines, config.merge_strategy, args.append),
        None if args.json => {
            let output = DayJson {
                plan: &plan,
                lines: &lines,
            };
            writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
            Ok(())
        }
        None => {
            for line in &lines {
                writeln!(writer, "{line}")?;
            }
            Ok(())
        }
    }
}

/// Reconciles `lines` into the note at `path`, writing only when the content
/// changes.
pub fn update_note<W: Write>(
    writer: &mut W,
    path: &Path,
    lines: &[String],
    strategy: MergeStrategy,
    append: bool,
) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = Document::parse(&text);

    match document.reconcile(strategy, lines) {
        Reconciliation::Updated { content, stats } => {
            write_if_changed(path, &text, &content.to_string())?;
            tracing::info!(%stats, collapsed_blank = stats.collapsed_blank, "reconciled note");
            writeln!(writer, "SUCCESS:{stats}")?;
        }
        Reconciliation::NoExistingEvents if append => {
            let (content, added) = document.append(lines);
            write_if_changed(path, &text, &content.to_string())?;
            tracing::info!(added, "appended events to note");
            writeln!(writer, "APPENDED:{added} events")?;
        }
        Reconciliation::NoExistingEvents => {
            writeln!(writer, "NO_EXISTING_EVENTS")?;
        }
    }
    Ok(())
}

fn write_if_changed(path: &Path, before: &str, after: &str) -> Result<()> {
    if before == after {
        tracing::debug!(path = %path.display(), "note unchanged");
        return Ok(());
    }
    fs::write(path, after).with_context(|| format!("failed to write {}", path.display()))
}
