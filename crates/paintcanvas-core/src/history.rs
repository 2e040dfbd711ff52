//! Stroke history log and replay planning.
//!
//! The history is a linear log of entries, one per completed gesture, plus a
//! cursor saying how many of them are visible. Undo and redo only move the
//! cursor; the raster is rebuilt by replaying a prefix of the log.

use crate::color::StrokeColor;
use crate::raster::Raster;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One drawn line segment. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub color: StrokeColor,
    pub width: f64,
}

impl Segment {
    pub fn new(from: Point, to: Point, color: StrokeColor, width: f64) -> Self {
        Self { from, to, color, width }
    }

    /// Whether both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }
}

/// The segments produced by one continuous gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry {
    segments: Vec<Segment>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// How a replay rebuilds the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Draw only the entries between the current step and the destination
    /// on top of the existing raster.
    Incremental,
    /// Clear the raster and redraw every entry up to the destination.
    Full,
}

/// The work a replay has to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPlan {
    pub mode: ReplayMode,
    /// Entries to draw, in order.
    pub range: Range<usize>,
    /// Cursor value once the replay is done.
    pub destination: usize,
}

/// Ordered log of entries plus the current-step cursor.
///
/// `current_step` always stays within `0..=log.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct History {
    log: Vec<Entry>,
    current_step: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &[Entry] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn can_undo(&self) -> bool {
        self.current_step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_step < self.log.len()
    }

    /// Clamp a requested step into `0..=len`.
    pub fn clamp_step(&self, step: isize) -> usize {
        step.clamp(0, self.log.len() as isize) as usize
    }

    /// Commit a finished gesture.
    ///
    /// Entries past the cursor are discarded first, so a new edit after an undo
    /// drops the redo history. Empty entries are rejected. Returns whether the
    /// entry was committed.
    pub fn commit(&mut self, entry: Entry) -> bool {
        if entry.is_empty() {
            return false;
        }
        if self.current_step < self.log.len() {
            log::debug!(
                "Discarding {} redo entries",
                self.log.len() - self.current_step
            );
            self.log.truncate(self.current_step);
        }
        self.log.push(entry);
        self.current_step = self.log.len();
        true
    }

    /// Move the cursor. Returns whether it changed.
    pub(crate) fn set_step(&mut self, step: usize) -> bool {
        let step = step.min(self.log.len());
        let changed = step != self.current_step;
        self.current_step = step;
        changed
    }

    /// Drop every entry and rewind the cursor.
    pub fn reset(&mut self) {
        self.log.clear();
        self.current_step = 0;
    }

    /// Decide how to reach `target` from the current step.
    ///
    /// Only an explicit, non-zero target at or ahead of the cursor replays
    /// incrementally. No target means "redraw what is visible now" and always
    /// clears first.
    pub fn plan(&self, target: Option<isize>) -> ReplayPlan {
        let destination = match target {
            Some(step) => self.clamp_step(step),
            None => self.current_step,
        };
        let incremental = matches!(target, Some(step) if step > 0)
            && destination >= self.current_step;

        if incremental {
            ReplayPlan {
                mode: ReplayMode::Incremental,
                range: self.current_step..destination,
                destination,
            }
        } else {
            ReplayPlan {
                mode: ReplayMode::Full,
                range: 0..destination,
                destination,
            }
        }
    }

    /// Entries in `range`, clamped to the log.
    pub fn entries(&self, range: Range<usize>) -> &[Entry] {
        let end = range.end.min(self.log.len());
        let start = range.start.min(end);
        &self.log[start..end]
    }

    /// Serialize the log and cursor to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Draw every segment of `entries` in order onto `raster`.
pub fn draw_entries<R: Raster + ?Sized>(raster: &mut R, entries: &[Entry]) {
    for entry in entries {
        for segment in entry.segments() {
            raster.stroke_segment(segment);
        }
    }
}
