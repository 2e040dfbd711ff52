//! PaintCanvas DPI Library
//!
//! Rewrites the pixel-density metadata of already encoded PNG and JPEG
//! images so a HiDPI raster is displayed at its logical size after upload.
//! Only header bytes are touched; image data is copied through unchanged.

mod data_url;
mod jfif;
mod phys;

pub use data_url::change_dpi_data_url;
pub use jfif::change_dpi_jpeg;
pub use phys::{PHYS_CHUNK_LEN, change_dpi_png, pixels_per_meter};

use thiserror::Error;

/// Image formats whose density can be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from the leading signature bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&phys::SIGNATURE) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// Format for a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Png => f.write_str("PNG"),
            ImageFormat::Jpeg => f.write_str("JPEG"),
        }
    }
}

/// Density rewriting errors.
#[derive(Debug, Error)]
pub enum DpiError {
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Malformed {format} image: {reason}")]
    Malformed {
        format: ImageFormat,
        reason: &'static str,
    },
    #[error("{dpi} dpi cannot be stored in a {format} header")]
    DpiOutOfRange { format: ImageFormat, dpi: u32 },
    #[error("Invalid data URL")]
    InvalidDataUrl,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type for density rewriting.
pub type DpiResult<T> = Result<T, DpiError>;

/// Rewrite the density of a PNG or JPEG, detected from its signature.
pub fn change_dpi(bytes: &[u8], dpi: u32) -> DpiResult<Vec<u8>> {
    match ImageFormat::detect(bytes) {
        Some(format) => change_dpi_as(bytes, dpi, format),
        None => Err(DpiError::UnsupportedFormat),
    }
}

/// Rewrite the density of an image known to be `format`.
pub fn change_dpi_as(bytes: &[u8], dpi: u32, format: ImageFormat) -> DpiResult<Vec<u8>> {
    match format {
        ImageFormat::Png => change_dpi_png(bytes, dpi),
        ImageFormat::Jpeg => change_dpi_jpeg(bytes, dpi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(
            ImageFormat::detect(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a"), None);
        assert_eq!(ImageFormat::detect(&[]), None);
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("IMAGE/JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/webp"), None);
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn test_change_dpi_rejects_unknown_bytes() {
        assert!(matches!(
            change_dpi(b"not an image at all, just text", 96),
            Err(DpiError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = DpiError::Malformed {
            format: ImageFormat::Png,
            reason: "missing IHDR chunk",
        };
        assert_eq!(err.to_string(), "Malformed PNG image: missing IHDR chunk");
    }
}
