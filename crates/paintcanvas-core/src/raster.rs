//! Raster backend abstraction.

use crate::color::StrokeColor;
use crate::history::Segment;
use kurbo::Size;

/// Trait for raster backends a surface draws onto.
///
/// Drawing commands are issued in logical coordinates. Backends map them to
/// device pixels using the scale passed to [`Raster::clear`].
pub trait Raster {
    /// Resize to `size * scale` device pixels and fill with `background`.
    fn clear(&mut self, size: Size, scale: f64, background: StrokeColor);

    /// Stroke one segment with round joins and caps.
    fn stroke_segment(&mut self, segment: &Segment);
}

/// A command recorded by [`CommandRaster`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        size: Size,
        scale: f64,
        background: StrokeColor,
    },
    Stroke(Segment),
}

/// Backend that records draw commands instead of producing pixels.
///
/// The visible picture is whatever follows the last clear, which makes it
/// handy for checking what a replay actually drew.
#[derive(Debug, Clone, Default)]
pub struct CommandRaster {
    commands: Vec<DrawCommand>,
}

impl CommandRaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command since creation.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Segments stroked since the last clear.
    pub fn visible_segments(&self) -> Vec<Segment> {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke(segment) => Some(*segment),
                DrawCommand::Clear { .. } => None,
            })
            .collect()
    }

    /// The most recent clear, if any.
    pub fn last_clear(&self) -> Option<&DrawCommand> {
        self.commands
            .iter()
            .rev()
            .find(|c| matches!(c, DrawCommand::Clear { .. }))
    }

    /// Number of clears issued.
    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear { .. }))
            .count()
    }

    /// Forget recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Raster for CommandRaster {
    fn clear(&mut self, size: Size, scale: f64, background: StrokeColor) {
        self.commands.push(DrawCommand::Clear {
            size,
            scale,
            background,
        });
    }

    fn stroke_segment(&mut self, segment: &Segment) {
        self.commands.push(DrawCommand::Stroke(*segment));
    }
}
