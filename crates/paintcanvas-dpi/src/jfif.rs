//! JPEG density via the JFIF APP0 header.

use crate::{DpiError, DpiResult, ImageFormat};

/// Offset of the density unit byte; X and Y density follow as big-endian u16.
const UNITS_OFFSET: usize = 13;
const HEADER_END: usize = 18;
const UNIT_DPI: u8 = 1;

fn malformed(reason: &'static str) -> DpiError {
    DpiError::Malformed {
        format: ImageFormat::Jpeg,
        reason,
    }
}

/// Set the density of a JFIF-encoded JPEG.
///
/// Writes the unit (dots per inch) and both densities into the APP0 header.
/// Every other byte is left as is.
pub fn change_dpi_jpeg(bytes: &[u8], dpi: u32) -> DpiResult<Vec<u8>> {
    let density = u16::try_from(dpi).map_err(|_| DpiError::DpiOutOfRange {
        format: ImageFormat::Jpeg,
        dpi,
    })?;
    if bytes.len() < HEADER_END || bytes[0..2] != [0xFF, 0xD8] {
        return Err(malformed("missing start of image marker"));
    }
    if bytes[2..4] != [0xFF, 0xE0] || &bytes[6..11] != b"JFIF\0" {
        return Err(malformed("missing JFIF APP0 segment"));
    }

    let [hi, lo] = density.to_be_bytes();
    let mut out = bytes.to_vec();
    out[UNITS_OFFSET..HEADER_END].copy_from_slice(&[UNIT_DPI, hi, lo, hi, lo]);
    log::debug!("Set JFIF density to {} dpi", dpi);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jfif_header() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        bytes.extend_from_slice(b"JFIF\0");
        // version 1.1, aspect-ratio units, 1:1, no thumbnail
        bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
        // start of a quantization table, standing in for image data
        bytes.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00, 0x10, 0x0B]);
        bytes
    }

    #[test]
    fn test_sets_density_bytes() {
        let input = jfif_header();
        let out = change_dpi_jpeg(&input, 300).unwrap();

        assert_eq!(&out[13..18], &[1, 0x01, 0x2C, 0x01, 0x2C]);
        assert_eq!(out.len(), input.len());
        assert_eq!(&out[..13], &input[..13]);
        assert_eq!(&out[18..], &input[18..]);
    }

    #[test]
    fn test_small_dpi() {
        let out = change_dpi_jpeg(&jfif_header(), 72).unwrap();
        assert_eq!(&out[13..18], &[1, 0, 72, 0, 72]);
    }

    #[test]
    fn test_rejects_exif_only_jpeg() {
        let mut input = jfif_header();
        input[3] = 0xE1;
        assert!(matches!(
            change_dpi_jpeg(&input, 72),
            Err(DpiError::Malformed { format: ImageFormat::Jpeg, .. })
        ));
    }

    #[test]
    fn test_rejects_short_input() {
        assert!(change_dpi_jpeg(&[0xFF, 0xD8, 0xFF], 72).is_err());
    }

    #[test]
    fn test_rejects_dpi_out_of_range() {
        assert!(matches!(
            change_dpi_jpeg(&jfif_header(), 70_000),
            Err(DpiError::DpiOutOfRange { dpi: 70_000, .. })
        ));
    }
}
