//! Pixel-size sniffing for generated images.
//!
//! Only the header is read; the picture is embedded in the deck unchanged.

use crate::types::ImageFormat;

/// Read `(width, height)` in pixels from an encoded image header.
pub fn dimensions(bytes: &[u8], format: ImageFormat) -> Option<(u32, u32)> {
    let dims = match format {
        ImageFormat::Png => png_dimensions(bytes),
        ImageFormat::Jpeg => jpeg_dimensions(bytes),
        ImageFormat::Webp => None,
    }?;

    if dims.0 == 0 || dims.1 == 0 {
        return None;
    }
    Some(dims)
}

/// PNG: the IHDR chunk always comes first, right after the 8-byte signature.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some((width, height))
}

/// JPEG: walk the marker segments until a start-of-frame marker.
fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;

    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];

        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            pos += 2;
            continue;
        }

        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if pos + 9 > bytes.len() {
                return None;
            }
            let height = u16::from_be_bytes([bytes[pos + 5], bytes[pos + 6]]) as u32;
            let width = u16::from_be_bytes([bytes[pos + 7], bytes[pos + 8]]) as u32;
            return Some((width, height));
        }

        pos += 2 + len;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(dimensions(&png_header(1024, 768), ImageFormat::Png), Some((1024, 768)));
    }

    #[test]
    fn test_png_truncated() {
        assert_eq!(dimensions(&png_header(1024, 768)[..20], ImageFormat::Png), None);
    }

    #[test]
    fn test_zero_size_is_unknown() {
        assert_eq!(dimensions(&png_header(0, 768), ImageFormat::Png), None);
    }

    #[test]
    fn test_jpeg_dimensions() {
        let bytes = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, // APP0, 2 payload bytes
            0xFF, 0xC0, 0x00, 0x11, 0x08, 0x02, 0x58, 0x03, 0x20, // SOF0 600x800
        ];
        assert_eq!(dimensions(&bytes, ImageFormat::Jpeg), Some((800, 600)));
    }

    #[test]
    fn test_jpeg_without_frame() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xD9];
        assert_eq!(dimensions(&bytes, ImageFormat::Jpeg), None);
    }
}
