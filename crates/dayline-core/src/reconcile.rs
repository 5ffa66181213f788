//! Splicing freshly rendered event lines into an existing document.
//!
//! Only lines the recognizer accepts ("slots") are ever replaced, removed, or
//! used as an insertion anchor. Everything else in the document is carried
//! through byte for byte, so running the same render twice is a no-op.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::render::{EventLine, is_event_line, recognize};
use crate::types::MergeStrategy;

/// What a reconciliation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Slots overwritten with a new line.
    pub replaced: usize,
    /// Slots removed.
    pub deleted: usize,
    /// New lines inserted after the last slot.
    pub added: usize,
    /// Slots left as they were (keyed merges only).
    pub kept: usize,
    /// Whether a blank line left in front of a shrunken block was removed.
    pub collapsed_blank: bool,
}

impl fmt::Display for ReconcileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} deleted, {} added",
            self.replaced, self.deleted, self.added
        )
    }
}

/// Result of reconciling new lines into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation<T = Vec<String>> {
    /// The document had event lines and was patched.
    Updated { content: T, stats: ReconcileStats },
    /// The document has no event lines; the caller should append instead.
    NoExistingEvents,
}

/// Merges `new_lines` into `document` using `strategy`.
///
/// New lines the recognizer would not find again are dropped first, so every
/// line written is a slot on the next run.
pub fn reconcile(
    strategy: MergeStrategy,
    new_lines: &[String],
    document: &[String],
) -> Reconciliation {
    let slots: Vec<usize> = document
        .iter()
        .enumerate()
        .filter(|(_, line)| is_event_line(line))
        .map(|(index, _)| index)
        .collect();

    let (Some(&first), Some(&last)) = (slots.first(), slots.last()) else {
        tracing::debug!("no event lines in document");
        return Reconciliation::NoExistingEvents;
    };

    let new_lines = recognizable(new_lines);
    tracing::debug!(
        %strategy,
        slots = slots.len(),
        new_lines = new_lines.len(),
        "reconciling event lines"
    );

    let (content, stats) = match strategy {
        MergeStrategy::Positional => positional(document, &slots, first, last, &new_lines),
        MergeStrategy::Keyed => keyed(document, &slots, last, &new_lines),
    };
    Reconciliation::Updated { content, stats }
}

fn recognizable(new_lines: &[String]) -> Vec<&str> {
    new_lines
        .iter()
        .filter(|line| {
            let ok = is_event_line(line);
            if !ok {
                tracing::warn!(line = %line, "skipping new line that is not an event line");
            }
            ok
        })
        .map(String::as_str)
        .collect()
}

/// Slot `i` takes new line `i`; surplus slots go, surplus lines follow the
/// last slot.
fn positional(
    document: &[String],
    slots: &[usize],
    first: usize,
    last: usize,
    new_lines: &[&str],
) -> (Vec<String>, ReconcileStats) {
    let mut stats = ReconcileStats::default();
    let shrinking = slots.len() > new_lines.len();
    let collapse_at = first
        .checked_sub(1)
        .filter(|&index| shrinking && document[index].trim().is_empty());

    let mut slot_iter = slots.iter().peekable();
    let mut replacements = new_lines.iter();
    let mut out = Vec::with_capacity(document.len() + new_lines.len());

    for (index, line) in document.iter().enumerate() {
        if slot_iter.next_if_eq(&&index).is_some() {
            if let Some(new) = replacements.next() {
                tracing::debug!(line = index, "replace");
                out.push((*new).to_string());
                stats.replaced += 1;
            } else {
                tracing::debug!(line = index, "delete");
                stats.deleted += 1;
            }
        } else if collapse_at == Some(index) {
            tracing::debug!(line = index, "collapse blank line before event block");
            stats.collapsed_blank = true;
        } else {
            out.push(line.clone());
        }

        if index == last {
            for extra in replacements.by_ref() {
                out.push((*extra).to_string());
                stats.added += 1;
            }
        }
    }

    (out, stats)
}

/// Slots are matched to new lines by `(time, title)`; unmatched slots stay,
/// unmatched new lines follow the last slot.
fn keyed(
    document: &[String],
    slots: &[usize],
    last: usize,
    new_lines: &[&str],
) -> (Vec<String>, ReconcileStats) {
    let mut pending: HashMap<EventLine<'_>, VecDeque<usize>> = HashMap::new();
    for (position, line) in new_lines.iter().enumerate() {
        if let Some(key) = recognize(line) {
            pending.entry(key).or_default().push_back(position);
        }
    }

    let mut assigned: HashMap<usize, usize> = HashMap::new();
    for &slot in slots {
        let matched = recognize(&document[slot])
            .and_then(|key| pending.get_mut(&key))
            .and_then(VecDeque::pop_front);
        if let Some(position) = matched {
            assigned.insert(slot, position);
        }
    }

    let mut used = vec![false; new_lines.len()];
    for &position in assigned.values() {
        used[position] = true;
    }

    let mut stats = ReconcileStats::default();
    let mut slot_iter = slots.iter().peekable();
    let mut out = Vec::with_capacity(document.len() + new_lines.len());

    for (index, line) in document.iter().enumerate() {
        let is_slot = slot_iter.next_if_eq(&&index).is_some();
        match assigned.get(&index) {
            Some(&position) => {
                out.push(new_lines[position].to_string());
                stats.replaced += 1;
            }
            None => {
                out.push(line.clone());
                if is_slot {
                    stats.kept += 1;
                }
            }
        }

        if index == last {
            for (position, extra) in new_lines.iter().enumerate() {
                if !used[position] {
                    out.push((*extra).to_string());
                    stats.added += 1;
                }
            }
        }
    }

    (out, stats)
}

/// A text document as an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl Document {
    /// Splits text into lines, remembering whether it ended with a newline.
    pub fn parse(text: &str) -> Self {
        let (body, trailing_newline) = text
            .strip_suffix('\n')
            .map_or((text, false), |body| (body, true));
        let lines = if body.is_empty() && !trailing_newline {
            Vec::new()
        } else {
            body.split('\n').map(str::to_string).collect()
        };
        Self {
            lines,
            trailing_newline,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub const fn has_trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Number of lines the recognizer accepts.
    pub fn event_line_count(&self) -> usize {
        self.lines.iter().filter(|line| is_event_line(line)).count()
    }

    /// Reconciles `new_lines` into a copy of this document.
    pub fn reconcile(&self, strategy: MergeStrategy, new_lines: &[String]) -> Reconciliation<Self> {
        match reconcile(strategy, new_lines, &self.lines) {
            Reconciliation::Updated { content, stats } => Reconciliation::Updated {
                content: Self {
                    lines: content,
                    trailing_newline: self.trailing_newline,
                },
                stats,
            },
            Reconciliation::NoExistingEvents => Reconciliation::NoExistingEvents,
        }
    }

    /// Appends the recognizable `new_lines` at the end of a copy of this
    /// document. Returns the copy and the number of lines added.
    pub fn append(&self, new_lines: &[String]) -> (Self, usize) {
        let additions = recognizable(new_lines);
        let added = additions.len();
        let mut lines = self.lines.clone();
        lines.extend(additions.into_iter().map(str::to_string));
        let trailing_newline = self.trailing_newline || self.lines.is_empty();
        (
            Self {
                lines,
                trailing_newline,
            },
            added,
        )
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))?;
        if self.trailing_newline {
            f.write_str("\n")?;
        }
        Ok(())
    }
}
