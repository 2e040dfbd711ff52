//! Surface configuration: construction defaults, typed options and
//! string attributes.

use crate::color::StrokeColor;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Initial configuration a surface is constructed with.
///
/// Dimensions are not part of it; they are usually known only once the host
/// has laid the surface out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub color: StrokeColor,
    pub background_color: StrokeColor,
    pub stroke_width: f64,
    /// Device pixels per logical pixel.
    pub scale_factor: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            color: StrokeColor::black(),
            background_color: StrokeColor::white(),
            stroke_width: 10.0,
            scale_factor: 1.0,
        }
    }
}

/// Partial update applied by `Surface::configure`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    pub color: Option<StrokeColor>,
    pub background_color: Option<StrokeColor>,
    pub stroke_width: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SurfaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: StrokeColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_background_color(mut self, color: StrokeColor) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Observed string attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Height,
    Width,
    Color,
    /// Stroke width.
    Size,
    /// Background color.
    BgColor,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Height,
        Attribute::Width,
        Attribute::Color,
        Attribute::Size,
        Attribute::BgColor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Height => "height",
            Attribute::Width => "width",
            Attribute::Color => "color",
            Attribute::Size => "size",
            Attribute::BgColor => "bgcolor",
        }
    }

    /// Coerce a string value into options for this attribute.
    ///
    /// Returns `None` when the value cannot be understood. Numbers must be
    /// finite and non-negative.
    pub fn coerce(self, value: &str) -> Option<SurfaceOptions> {
        let value = value.trim();
        let number = || {
            value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite() && *n >= 0.0)
        };
        let options = SurfaceOptions::new();
        match self {
            Attribute::Height => number().map(|h| SurfaceOptions { height: Some(h), ..options }),
            Attribute::Width => number().map(|w| SurfaceOptions { width: Some(w), ..options }),
            Attribute::Size => number().map(|s| options.with_stroke_width(s)),
            Attribute::Color => value.parse().ok().map(|c| options.with_color(c)),
            Attribute::BgColor => value.parse().ok().map(|c| options.with_background_color(c)),
        }
    }
}

impl FromStr for Attribute {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
