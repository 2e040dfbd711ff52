//! Density rewriting for base64 data URLs.

use crate::{DpiError, DpiResult, ImageFormat, change_dpi_as};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Rewrite the density of an image embedded in a `data:` URL.
///
/// Only base64 payloads of `image/png` and `image/jpeg` are accepted. The
/// returned URL keeps the original header.
pub fn change_dpi_data_url(data_url: &str, dpi: u32) -> DpiResult<String> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(DpiError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DpiError::InvalidDataUrl)?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(DpiError::InvalidDataUrl);
    }
    let format = ImageFormat::from_mime(mime).ok_or(DpiError::UnsupportedFormat)?;

    let bytes = STANDARD.decode(payload.trim())?;
    let changed = change_dpi_as(&bytes, dpi, format)?;
    Ok(format!("data:{},{}", header, STANDARD.encode(changed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_url() -> String {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0, 0xFF, 0xD9]);
        format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn test_rewrites_jpeg_url() {
        let out = change_dpi_data_url(&jpeg_url(), 144).unwrap();
        let (header, payload) = out.split_once(',').unwrap();
        assert_eq!(header, "data:image/jpeg;base64");

        let bytes = STANDARD.decode(payload).unwrap();
        assert_eq!(&bytes[13..18], &[1, 0, 144, 0, 144]);
    }

    #[test]
    fn test_rejects_non_base64_url() {
        assert!(matches!(
            change_dpi_data_url("data:image/png,rawbytes", 72),
            Err(DpiError::InvalidDataUrl)
        ));
        assert!(matches!(
            change_dpi_data_url("image/png;base64,AAAA", 72),
            Err(DpiError::InvalidDataUrl)
        ));
    }

    #[test]
    fn test_rejects_other_media_types() {
        assert!(matches!(
            change_dpi_data_url("data:image/gif;base64,R0lGODlh", 72),
            Err(DpiError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_rejects_bad_base64() {
        assert!(matches!(
            change_dpi_data_url("data:image/png;base64,@@@@", 72),
            Err(DpiError::Base64(_))
        ));
    }
}
