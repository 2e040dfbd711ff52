//! The drawing surface: tool state, gesture capture and history replay.

use crate::color::StrokeColor;
use crate::events::{EventBus, HistoryEvent, HistoryEventKind, SurfaceId};
use crate::history::{Entry, History, ReplayMode, Segment, draw_entries};
use crate::input::{KeyEvent, PointerEvent};
use crate::options::{Attribute, SurfaceConfig, SurfaceOptions};
use crate::raster::Raster;
use crate::shortcuts::HistoryShortcut;
use kurbo::{Point, Size};
use uuid::Uuid;

/// Mutable tool and layout state. Owned by exactly one surface.
#[derive(Debug, Clone, PartialEq)]
struct SurfaceState {
    color: StrokeColor,
    background_color: StrokeColor,
    stroke_width: f64,
    width: f64,
    height: f64,
    scale_factor: f64,
    is_drawing: bool,
    /// Where the next segment starts. Set to the gesture origin on begin.
    last_point: Option<Point>,
}

/// A freehand drawing surface with an undoable stroke history.
///
/// Every completed gesture becomes one history entry. Undo and redo move a
/// cursor through the log and rebuild the raster by replaying it, so the
/// raster always shows the log prefix up to the cursor drawn over the
/// background.
#[derive(Debug)]
pub struct Surface<R: Raster> {
    id: SurfaceId,
    state: SurfaceState,
    history: History,
    /// Segments of the gesture in progress.
    current_entry: Entry,
    raster: R,
    bus: EventBus,
}

impl<R: Raster> Surface<R> {
    /// Create a surface with its own notification bus.
    pub fn new(config: SurfaceConfig, raster: R) -> Self {
        Self::with_bus(config, raster, EventBus::new())
    }

    /// Create a surface that dispatches notifications on `bus`.
    ///
    /// Pass a child of a shared bus to let an ancestor observe this surface.
    pub fn with_bus(config: SurfaceConfig, raster: R, bus: EventBus) -> Self {
        let scale_factor = if config.scale_factor.is_finite() && config.scale_factor > 0.0 {
            config.scale_factor
        } else {
            1.0
        };
        let mut surface = Self {
            id: Uuid::new_v4(),
            state: SurfaceState {
                color: config.color,
                background_color: config.background_color,
                stroke_width: config.stroke_width,
                width: 0.0,
                height: 0.0,
                scale_factor,
                is_drawing: false,
                last_point: None,
            },
            history: History::new(),
            current_entry: Entry::new(),
            raster,
            bus,
        };
        surface.clear();
        surface
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// The bus this surface dispatches notifications on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn raster(&self) -> &R {
        &self.raster
    }

    /// Consume the surface and keep its raster.
    pub fn into_raster(self) -> R {
        self.raster
    }

    pub fn color(&self) -> StrokeColor {
        self.state.color
    }

    pub fn background_color(&self) -> StrokeColor {
        self.state.background_color
    }

    pub fn stroke_width(&self) -> f64 {
        self.state.stroke_width
    }

    pub fn width(&self) -> f64 {
        self.state.width
    }

    pub fn height(&self) -> f64 {
        self.state.height
    }

    /// Logical size.
    pub fn size(&self) -> Size {
        Size::new(self.state.width, self.state.height)
    }

    pub fn scale_factor(&self) -> f64 {
        self.state.scale_factor
    }

    pub fn is_drawing(&self) -> bool {
        self.state.is_drawing
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn log(&self) -> &[Entry] {
        self.history.log()
    }

    pub fn current_step(&self) -> usize {
        self.history.current_step()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Segments of the gesture in progress.
    pub fn current_entry(&self) -> &Entry {
        &self.current_entry
    }

    /// Apply a partial configuration.
    ///
    /// A change of width, height or background color redraws the visible
    /// history from scratch at the new settings. Recorded coordinates are
    /// reused as-is. Color and stroke width only affect future strokes.
    pub fn configure(&mut self, options: SurfaceOptions) {
        let mut needs_replay = false;

        if let Some(color) = options.color {
            self.state.color = color;
        }
        if let Some(width) = options.stroke_width {
            self.state.stroke_width = width;
        }
        if let Some(width) = options.width {
            needs_replay |= width != self.state.width;
            self.state.width = width;
        }
        if let Some(height) = options.height {
            needs_replay |= height != self.state.height;
            self.state.height = height;
        }
        if let Some(background) = options.background_color {
            needs_replay |= background != self.state.background_color;
            self.state.background_color = background;
        }

        if needs_replay {
            self.replay(None);
        }
    }

    /// Set a string attribute, coercing the value.
    ///
    /// Unknown attributes and values that cannot be coerced are ignored.
    /// Returns whether the attribute was applied.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        let Ok(attribute) = name.parse::<Attribute>() else {
            log::warn!("Ignoring unknown attribute {:?}", name);
            return false;
        };
        match attribute.coerce(value) {
            Some(options) => {
                self.configure(options);
                true
            }
            None => {
                log::warn!("Ignoring invalid value {:?} for attribute {}", value, attribute);
                false
            }
        }
    }

    /// Read an attribute back as a string.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let attribute = name.parse::<Attribute>().ok()?;
        Some(match attribute {
            Attribute::Height => self.state.height.to_string(),
            Attribute::Width => self.state.width.to_string(),
            Attribute::Color => self.state.color.to_hex(),
            Attribute::Size => self.state.stroke_width.to_string(),
            Attribute::BgColor => self.state.background_color.to_hex(),
        })
    }

    /// Change the device scale factor. Redraws like a resize.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            log::warn!("Ignoring invalid scale factor {}", scale_factor);
            return;
        }
        if scale_factor != self.state.scale_factor {
            self.state.scale_factor = scale_factor;
            self.replay(None);
        }
    }

    /// Fill the raster with the background color. History is untouched.
    pub fn clear(&mut self) {
        self.raster.clear(
            self.size(),
            self.state.scale_factor,
            self.state.background_color,
        );
    }

    /// Clear the raster and drop the whole history, including any gesture in
    /// progress.
    pub fn reset(&mut self) {
        self.clear();
        self.history.reset();
        self.current_entry = Entry::new();
        self.state.is_drawing = false;
        self.state.last_point = None;
    }

    /// Start a single-contact gesture at `point`. Ignored while one is active.
    pub fn begin_gesture(&mut self, point: Point) {
        if self.state.is_drawing {
            return;
        }
        self.state.is_drawing = true;
        self.state.last_point = Some(point);
        self.current_entry = Entry::new();
    }

    /// Draw a segment from the previous point to `point`.
    ///
    /// No-op when no gesture is active. A segment with coinciding endpoints
    /// is neither drawn nor recorded.
    pub fn extend_gesture(&mut self, point: Point) {
        if !self.state.is_drawing {
            return;
        }
        let from = self.state.last_point.unwrap_or(point);
        let segment = Segment::new(from, point, self.state.color, self.state.stroke_width);
        if !segment.is_degenerate() {
            self.raster.stroke_segment(&segment);
            self.current_entry.push(segment);
        }
        self.state.last_point = Some(point);
    }

    /// Finish the gesture at `point` and commit it if anything was drawn.
    pub fn end_gesture(&mut self, point: Point) {
        self.extend_gesture(point);

        let entry = std::mem::take(&mut self.current_entry);
        let segments = entry.len();
        if self.history.commit(entry) {
            log::debug!(
                "Committed entry with {} segments, step {}",
                segments,
                self.history.current_step()
            );
            self.emit(HistoryEventKind::Changed);
            self.emit(HistoryEventKind::Step);
        }

        self.state.is_drawing = false;
        self.state.last_point = None;
    }

    /// Step back one entry. Returns whether the step changed.
    pub fn undo(&mut self) -> bool {
        let step = self.history.current_step();
        if step == 0 {
            return false;
        }
        self.replay(Some(step as isize - 1))
    }

    /// Step forward one entry. Returns whether the step changed.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        self.replay(Some(self.history.current_step() as isize + 1))
    }

    /// Rebuild the raster for `target` (clamped to the log), or for the
    /// current step when no target is given.
    ///
    /// Returns whether the current step changed. A change emits a
    /// history-step notification.
    pub fn replay(&mut self, target: Option<isize>) -> bool {
        let mut plan = self.history.plan(target);
        if self.state.is_drawing && plan.mode == ReplayMode::Incremental {
            // The stroke in progress has to stay above every replayed entry.
            plan.mode = ReplayMode::Full;
            plan.range = 0..plan.destination;
        }
        log::debug!(
            "Replay {:?} entries {:?} to step {}",
            plan.mode,
            plan.range,
            plan.destination
        );

        if plan.mode == ReplayMode::Full {
            self.clear();
        }
        draw_entries(&mut self.raster, self.history.entries(plan.range.clone()));
        if plan.mode == ReplayMode::Full && self.state.is_drawing {
            // Keep the stroke under the pointer visible.
            draw_entries(&mut self.raster, std::slice::from_ref(&self.current_entry));
        }

        let changed = self.history.set_step(plan.destination);
        if changed {
            self.emit(HistoryEventKind::Step);
        }
        changed
    }

    /// Interpret a pointer event. Multi-contact events are ignored.
    ///
    /// Returns whether the event was consumed.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        if event.is_multi_contact() {
            log::trace!("Ignoring multi-contact event {:?}", event);
            return false;
        }
        match event {
            PointerEvent::Down { position, .. } => self.begin_gesture(position),
            PointerEvent::Move { position, .. } => self.extend_gesture(position),
            PointerEvent::Up { position, .. }
            | PointerEvent::Cancel { position, .. }
            | PointerEvent::Leave { position } => self.end_gesture(position),
        }
        true
    }

    /// Apply the undo/redo keyboard shortcuts.
    ///
    /// Returns whether the key was a shortcut.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        match HistoryShortcut::from_key_event(event) {
            Some(HistoryShortcut::Undo) => {
                self.undo();
                true
            }
            Some(HistoryShortcut::Redo) => {
                self.redo();
                true
            }
            None => false,
        }
    }

    fn emit(&self, kind: HistoryEventKind) {
        let event = HistoryEvent {
            kind,
            source: self.id,
            log: self.history.log(),
            current_step: self.history.current_step(),
        };
        self.bus.dispatch(&event);
    }
}
