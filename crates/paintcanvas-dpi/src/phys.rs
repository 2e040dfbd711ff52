//! PNG density via the `pHYs` chunk.

use crate::{DpiError, DpiResult, ImageFormat};

pub(crate) const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// End of the signature plus the `IHDR` chunk, which is always first.
const HEADER_END: usize = 33;

/// Bytes of a complete `pHYs` chunk: length, type, 9-byte payload, CRC.
pub const PHYS_CHUNK_LEN: usize = 21;

const PHYS_PAYLOAD_LEN: u32 = 9;
const INCHES_PER_METER: f64 = 39.3701;
const UNIT_METER: u8 = 1;

/// Pixels per meter for a density given in dots per inch.
pub fn pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) * INCHES_PER_METER) as u32
}

fn malformed(reason: &'static str) -> DpiError {
    DpiError::Malformed {
        format: ImageFormat::Png,
        reason,
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let word = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
}

/// Build a complete `pHYs` chunk with equal X and Y density.
fn phys_chunk(dpi: u32) -> [u8; PHYS_CHUNK_LEN] {
    let ppm = pixels_per_meter(dpi).to_be_bytes();
    let mut chunk = [0u8; PHYS_CHUNK_LEN];
    chunk[0..4].copy_from_slice(&PHYS_PAYLOAD_LEN.to_be_bytes());
    chunk[4..8].copy_from_slice(b"pHYs");
    chunk[8..12].copy_from_slice(&ppm);
    chunk[12..16].copy_from_slice(&ppm);
    chunk[16] = UNIT_METER;
    // CRC covers the chunk type and payload, not the length.
    let crc = crc32fast::hash(&chunk[4..17]);
    chunk[17..21].copy_from_slice(&crc.to_be_bytes());
    chunk
}

/// Locate an existing `pHYs` chunk among the chunks preceding image data.
fn find_phys(bytes: &[u8]) -> DpiResult<Option<usize>> {
    let mut pos = HEADER_END;
    while let Some(length) = read_u32(bytes, pos) {
        let Some(kind) = bytes.get(pos + 4..pos + 8) else {
            break;
        };
        match kind {
            b"pHYs" => {
                if length != PHYS_PAYLOAD_LEN || bytes.len() < pos + PHYS_CHUNK_LEN {
                    return Err(malformed("truncated pHYs chunk"));
                }
                return Ok(Some(pos));
            }
            // pHYs must precede image data.
            b"IDAT" | b"IEND" => break,
            _ => {}
        }
        match (length as usize)
            .checked_add(12)
            .and_then(|len| pos.checked_add(len))
        {
            Some(next) => pos = next,
            None => break,
        }
    }
    Ok(None)
}

/// Set the density of an encoded PNG.
///
/// An existing `pHYs` chunk is overwritten in place. Otherwise a new chunk
/// is inserted right after `IHDR`, growing the file by [`PHYS_CHUNK_LEN`]
/// bytes.
pub fn change_dpi_png(bytes: &[u8], dpi: u32) -> DpiResult<Vec<u8>> {
    if !bytes.starts_with(&SIGNATURE) {
        return Err(malformed("missing PNG signature"));
    }
    if bytes.len() < HEADER_END
        || read_u32(bytes, 8) != Some(13)
        || &bytes[12..16] != b"IHDR"
    {
        return Err(malformed("missing IHDR chunk"));
    }

    let chunk = phys_chunk(dpi);
    match find_phys(bytes)? {
        Some(pos) => {
            log::debug!("Overwriting pHYs chunk at offset {} ({} dpi)", pos, dpi);
            let mut out = bytes.to_vec();
            out[pos..pos + PHYS_CHUNK_LEN].copy_from_slice(&chunk);
            Ok(out)
        }
        None => {
            log::debug!("Inserting pHYs chunk after IHDR ({} dpi)", dpi);
            let mut out = Vec::with_capacity(bytes.len() + PHYS_CHUNK_LEN);
            out.extend_from_slice(&bytes[..HEADER_END]);
            out.extend_from_slice(&chunk);
            out.extend_from_slice(&bytes[HEADER_END..]);
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Signature, IHDR for a 1x1 image and IEND. CRCs are not checked here.
    fn minimal_png() -> Vec<u8> {
        let mut bytes = SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(b"IEND");
        bytes.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
        bytes
    }

    #[test]
    fn test_pixels_per_meter() {
        assert_eq!(pixels_per_meter(72), 2834);
        assert_eq!(pixels_per_meter(96), 3779);
        assert_eq!(pixels_per_meter(144), 5669);
    }

    #[test]
    fn test_chunk_layout() {
        let chunk = phys_chunk(144);
        assert_eq!(&chunk[0..4], &[0, 0, 0, 9]);
        assert_eq!(&chunk[4..8], b"pHYs");
        assert_eq!(&chunk[8..12], &5669u32.to_be_bytes());
        assert_eq!(&chunk[12..16], &5669u32.to_be_bytes());
        assert_eq!(chunk[16], 1);
    }

    #[test]
    fn test_crc_matches_known_value() {
        // Every PNG ends with this IEND CRC.
        assert_eq!(crc32fast::hash(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn test_insert_after_header() {
        let input = minimal_png();
        let out = change_dpi_png(&input, 144).unwrap();

        assert_eq!(out.len(), input.len() + PHYS_CHUNK_LEN);
        assert_eq!(&out[..HEADER_END], &input[..HEADER_END]);
        assert_eq!(&out[HEADER_END..HEADER_END + PHYS_CHUNK_LEN], &phys_chunk(144));
        assert_eq!(&out[HEADER_END + PHYS_CHUNK_LEN..], &input[HEADER_END..]);
    }

    #[test]
    fn test_overwrite_existing_chunk() {
        let once = change_dpi_png(&minimal_png(), 144).unwrap();
        let twice = change_dpi_png(&once, 300).unwrap();

        assert_eq!(twice.len(), once.len());
        assert_eq!(&twice[HEADER_END..HEADER_END + PHYS_CHUNK_LEN], &phys_chunk(300));
    }

    #[test]
    fn test_rejects_missing_signature() {
        let mut input = minimal_png();
        input[1] = b'X';
        assert!(matches!(
            change_dpi_png(&input, 72),
            Err(DpiError::Malformed { format: ImageFormat::Png, .. })
        ));
    }

    #[test]
    fn test_rejects_truncated_header() {
        let input = minimal_png();
        assert!(change_dpi_png(&input[..20], 72).is_err());
    }

    #[test]
    fn test_rejects_truncated_phys() {
        let mut input = change_dpi_png(&minimal_png(), 72).unwrap();
        input.truncate(HEADER_END + 10);
        assert!(matches!(
            change_dpi_png(&input, 72),
            Err(DpiError::Malformed { reason: "truncated pHYs chunk", .. })
        ));
    }
}
