//! CPU raster backed by an RGBA8 image buffer.

use image::{Rgba, RgbaImage};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use paintcanvas_core::{Raster, Segment, StrokeColor};

/// Device-pixel raster with anti-aliased, round-capped strokes.
///
/// Strokes arrive in logical coordinates and are scaled by the factor given
/// to the last [`Raster::clear`], so a surface at scale 2 produces an image
/// twice as large in each direction.
#[derive(Debug, Clone)]
pub struct PixelRaster {
    image: RgbaImage,
    scale: f64,
}

impl Default for PixelRaster {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelRaster {
    /// Create an empty 0×0 raster.
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            scale: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_rgba_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Pixel at device coordinates, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Whether every pixel equals `color`.
    pub fn is_filled_with(&self, color: StrokeColor) -> bool {
        let expected = [color.r, color.g, color.b, color.a];
        self.image.pixels().all(|p| p.0 == expected)
    }
}

/// Largest raster allocated, in device pixels (256 MiB of RGBA8).
const MAX_PIXELS: u64 = 1 << 26;

/// Device pixels for a logical length.
fn device_len(logical: f64, scale: f64) -> u32 {
    let len = (logical * scale).round();
    if len.is_finite() && len > 0.0 {
        len.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Distance from `point` to the segment `a`-`b`.
fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let line_vec = b - a;
    let point_vec = point - a;
    let line_len_sq = line_vec.hypot2();
    if line_len_sq < f64::EPSILON {
        return point_vec.hypot();
    }
    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = a + line_vec * t;
    (point - projection).hypot()
}

/// Source-over blend of `color` at `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, color: StrokeColor, coverage: f64) {
    let alpha = coverage * f64::from(color.a) / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let mix = |src: u8, dst: u8| -> u8 {
        (f64::from(src) * alpha + f64::from(dst) * (1.0 - alpha)).round() as u8
    };
    let [r, g, b, a] = dst.0;
    dst.0 = [
        mix(color.r, r),
        mix(color.g, g),
        mix(color.b, b),
        (alpha * 255.0 + f64::from(a) * (1.0 - alpha)).round() as u8,
    ];
}

impl Raster for PixelRaster {
    fn clear(&mut self, size: Size, scale: f64, background: StrokeColor) {
        let width = device_len(size.width, scale);
        let height = device_len(size.height, scale);
        let background = Rgba([background.r, background.g, background.b, background.a]);
        if u64::from(width) * u64::from(height) > MAX_PIXELS {
            log::warn!(
                "Ignoring raster size {}x{} above {} pixels, keeping {}x{}",
                width,
                height,
                MAX_PIXELS,
                self.image.width(),
                self.image.height()
            );
            for pixel in self.image.pixels_mut() {
                *pixel = background;
            }
            return;
        }
        if width != self.image.width() || height != self.image.height() {
            log::debug!("Raster resized to {}x{} (scale {})", width, height, scale);
        }
        self.scale = scale;
        self.image = RgbaImage::from_pixel(width, height, background);
    }

    fn stroke_segment(&mut self, segment: &Segment) {
        if self.image.width() == 0 || self.image.height() == 0 {
            return;
        }
        let to_device = Affine::scale(self.scale);
        let a = to_device * segment.from;
        let b = to_device * segment.to;
        let radius = segment.width * self.scale / 2.0;
        if radius.is_nan() || radius <= 0.0 {
            return;
        }

        let bounds = Rect::from_points(a, b)
            .inflate(radius + 1.0, radius + 1.0)
            .intersect(Rect::new(
                0.0,
                0.0,
                f64::from(self.image.width()),
                f64::from(self.image.height()),
            ));
        if bounds.is_zero_area() {
            return;
        }

        let x0 = bounds.x0.floor() as u32;
        let y0 = bounds.y0.floor() as u32;
        let x1 = (bounds.x1.ceil() as u32).min(self.image.width());
        let y1 = (bounds.y1.ceil() as u32).min(self.image.height());
        let half = Vec2::new(0.5, 0.5);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(f64::from(x), f64::from(y)) + half;
                let distance = distance_to_segment(center, a, b);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    blend(self.image.get_pixel_mut(x, y), segment.color, coverage);
                }
            }
        }
    }
}
