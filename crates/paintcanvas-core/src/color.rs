//! Color strings for strokes and backgrounds.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a color string cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized color: {0:?}")]
pub struct ColorParseError(pub String);

/// Serializable color representation (RGBA8).
///
/// Parsed from the same strings a color input produces (`#rgb`, `#rrggbb`,
/// `#rrggbbaa`) plus a handful of named colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl StrokeColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Whether the color is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for StrokeColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = s.trim();
        let err = || ColorParseError(s.to_string());

        if let Some(hex) = color.strip_prefix('#') {
            let channel = |range: std::ops::Range<usize>| {
                hex.get(range)
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(err)
            };
            return match hex.len() {
                3 => {
                    // #rgb -> #rrggbb
                    let r = channel(0..1)? * 17;
                    let g = channel(1..2)? * 17;
                    let b = channel(2..3)? * 17;
                    Ok(Self::new(r, g, b, 255))
                }
                6 => Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
                8 => Ok(Self::new(
                    channel(0..2)?,
                    channel(2..4)?,
                    channel(4..6)?,
                    channel(6..8)?,
                )),
                _ => Err(err()),
            };
        }

        match color.to_ascii_lowercase().as_str() {
            "black" => Ok(Self::black()),
            "white" => Ok(Self::white()),
            "red" => Ok(Self::new(255, 0, 0, 255)),
            "green" => Ok(Self::new(0, 128, 0, 255)),
            "blue" => Ok(Self::new(0, 0, 255, 255)),
            "transparent" => Ok(Self::transparent()),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrokeColor> for String {
    fn from(color: StrokeColor) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for StrokeColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<StrokeColor> for Color {
    fn from(color: StrokeColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        let color: StrokeColor = "#666666".parse().unwrap();
        assert_eq!(color, StrokeColor::new(0x66, 0x66, 0x66, 255));
    }

    #[test]
    fn test_parse_short_hex() {
        let color: StrokeColor = "#f0a".parse().unwrap();
        assert_eq!(color, StrokeColor::new(255, 0, 170, 255));
    }

    #[test]
    fn test_parse_hex_with_alpha() {
        let color: StrokeColor = "#00000080".parse().unwrap();
        assert_eq!(color.a, 0x80);
        assert_eq!(color.to_hex(), "#00000080");
    }

    #[test]
    fn test_parse_named() {
        assert_eq!("White".parse::<StrokeColor>().unwrap(), StrokeColor::white());
        assert_eq!(
            "transparent".parse::<StrokeColor>().unwrap(),
            StrokeColor::transparent()
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!("#12345".parse::<StrokeColor>().is_err());
        assert!("#gggggg".parse::<StrokeColor>().is_err());
        assert!("chartreuse-ish".parse::<StrokeColor>().is_err());
    }

    #[test]
    fn test_peniko_conversion() {
        let color = StrokeColor::new(10, 20, 30, 255);
        let peniko: Color = color.into();
        assert_eq!(StrokeColor::from(peniko), color);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&StrokeColor::new(255, 0, 0, 255)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: StrokeColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StrokeColor::new(255, 0, 0, 255));
    }
}
