//! PaintCanvas Core Library
//!
//! A freehand drawing surface whose strokes form a linear, replayable
//! history. Undo and redo rebuild the raster by replaying the log instead of
//! restoring pixel snapshots.

pub mod color;
pub mod events;
pub mod history;
pub mod input;
pub mod options;
pub mod raster;
pub mod shortcuts;
pub mod surface;

pub use color::{ColorParseError, StrokeColor};
pub use events::{EventBus, HistoryEvent, HistoryEventKind, ListenerId, SurfaceId};
pub use history::{Entry, History, ReplayMode, ReplayPlan, Segment};
pub use input::{KeyEvent, Modifiers, PointerEvent};
pub use options::{Attribute, SurfaceConfig, SurfaceOptions};
pub use raster::{CommandRaster, DrawCommand, Raster};
pub use shortcuts::{HistoryShortcut, SHORTCUTS, Shortcut};
pub use surface::Surface;
