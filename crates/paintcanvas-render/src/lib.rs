//! PaintCanvas Render Library
//!
//! Raster backends for PaintCanvas surfaces. The default backend rasterizes
//! strokes on the CPU into an RGBA8 buffer that hosts can encode and upload.

mod pixel;

pub use pixel::PixelRaster;
