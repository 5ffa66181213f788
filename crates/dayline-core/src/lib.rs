//! Core domain logic for dayline.
//!
//! This crate contains the pure, synchronous pieces of the pipeline:
//! - Boundary resolution: a day that runs from waking up to the next sleep
//! - Day selection: the events inside that window, framed by markers
//! - Rendering: markdown event lines and the recognizer that finds them again
//! - Reconciliation: splicing a new render into an existing note

pub mod boundary;
pub mod classify;
pub mod clock;
mod event;
pub mod filter;
pub mod reconcile;
pub mod render;
mod types;

pub use boundary::{DayWindow, InvalidWindow, fetch_range, resolve};
pub use event::{BoundaryMarker, CalendarEvent, EventTime, MalformedEvent};
pub use filter::{DayPlan, plan_day, select_day_events};
pub use reconcile::{Document, ReconcileStats, Reconciliation, reconcile};
pub use render::{EventLine, Renderer, is_event_line, recognize};
pub use types::{EventColor, MergeStrategy, Theme, ValidationError};
