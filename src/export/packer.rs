//! Pixel packer
//!
//! Quantizes 8-bit grayscale samples down to the export bit depth and packs
//! them MSB-first into bytes, one row at a time. A row's trailing partial
//! byte is never combined with the next row. Each packed row carries an
//! ASCII preview so a glyph can be recognized next to its byte dump in the
//! generated source.

/// Target bit depth for packed glyph bitmaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bpp {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl Bpp {
    /// Parse a numeric depth; only 1, 2, 4 and 8 are valid
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    /// Bit width of one packed pixel
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// One packed bitmap row: output bytes plus a human-readable preview line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedRow {
    pub bytes: Vec<u8>,
    pub preview: String,
}

/// Packed byte count for a row of `width` pixels: ceil(width * d / 8)
pub fn packed_len(width: usize, bpp: Bpp) -> usize {
    (width * bpp.bits() as usize + 7) / 8
}

/// Pack one row of 8-bit grayscale samples at the given depth.
///
/// Each sample is quantized by `sample >> (8 - d)` and OR-ed into the
/// accumulator at a bit position starting at `8 - d` and decreasing by `d`
/// per pixel; a full accumulator is flushed as one output byte. Bits left
/// over at row end are flushed as a final partial byte.
pub fn pack_row(pixels: &[u8], bpp: Bpp) -> PackedRow {
    let depth = bpp.bits();
    let mut bytes = Vec::with_capacity(packed_len(pixels.len(), bpp));
    let mut preview = String::with_capacity(pixels.len());
    let mut accumulator = 0u8;
    let mut bit_pos = (8 - depth) as i8;

    for &sample in pixels {
        let quantized = sample >> (8 - depth);
        preview.push(preview_char(quantized, bpp));

        accumulator |= quantized << bit_pos as u8;
        bit_pos -= depth as i8;
        if bit_pos < 0 {
            bytes.push(accumulator);
            accumulator = 0;
            bit_pos = (8 - depth) as i8;
        }
    }

    if bit_pos != (8 - depth) as i8 {
        // pixels are still waiting inside the accumulator
        bytes.push(accumulator);
    }

    PackedRow { bytes, preview }
}

/// Reduce a quantized value to at most 4 visual levels: `.`, `1`, `2`, `3`.
/// Advisory output only, independent of the numeric packing.
fn preview_char(quantized: u8, bpp: Bpp) -> char {
    let level = quantized >> bpp.bits().saturating_sub(2);
    if level == 0 {
        '.'
    } else {
        (b'0' + level) as char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DEPTHS: [Bpp; 4] = [Bpp::One, Bpp::Two, Bpp::Four, Bpp::Eight];

    /// Re-expand packed values to their quantized form
    fn unpack_row(bytes: &[u8], width: usize, bpp: Bpp) -> Vec<u8> {
        let depth = bpp.bits() as usize;
        (0..width)
            .map(|x| {
                let bit = x * depth;
                let shift = 8 - depth - (bit % 8);
                (bytes[bit / 8] >> shift) & (((1u16 << depth) - 1) as u8)
            })
            .collect()
    }

    #[test]
    fn test_bpp_from_u8() {
        assert_eq!(Bpp::from_u8(1), Some(Bpp::One));
        assert_eq!(Bpp::from_u8(2), Some(Bpp::Two));
        assert_eq!(Bpp::from_u8(4), Some(Bpp::Four));
        assert_eq!(Bpp::from_u8(8), Some(Bpp::Eight));
        assert_eq!(Bpp::from_u8(0), None);
        assert_eq!(Bpp::from_u8(3), None);
        assert_eq!(Bpp::from_u8(16), None);
    }

    #[test]
    fn test_packed_len_formula() {
        for bpp in ALL_DEPTHS {
            for width in 0..=33 {
                let pixels = vec![0xFFu8; width];
                let row = pack_row(&pixels, bpp);
                assert_eq!(row.bytes.len(), packed_len(width, bpp));
                assert_eq!(
                    row.bytes.len(),
                    (width * bpp.bits() as usize + 7) / 8,
                    "width {} at {} bpp",
                    width,
                    bpp.bits()
                );
            }
        }
    }

    #[test]
    fn test_pack_1bpp_two_pixels() {
        let row = pack_row(&[255, 0], Bpp::One);
        assert_eq!(row.bytes, vec![0x80]);
        assert_eq!(row.preview, "1.");
    }

    #[test]
    fn test_pack_4bpp_three_pixels() {
        // quantized 15, 8, 0: first byte holds 15 and 8, second holds the
        // left-padded 0 - two bytes for three pixels at 4 bpp
        let row = pack_row(&[255, 128, 0], Bpp::Four);
        assert_eq!(row.bytes, vec![0xF8, 0x00]);
        assert_eq!(row.preview, "32.");
    }

    #[test]
    fn test_pack_8bpp_is_identity() {
        let row = pack_row(&[0x12, 0xAB, 0x00, 0xFF], Bpp::Eight);
        assert_eq!(row.bytes, vec![0x12, 0xAB, 0x00, 0xFF]);
    }

    #[test]
    fn test_pack_2bpp_full_byte() {
        // 4 pixels of 2 bits fill exactly one byte
        let row = pack_row(&[255, 170, 85, 0], Bpp::Two);
        assert_eq!(row.bytes, vec![0b11_10_01_00]);
        assert_eq!(row.preview, "321.");
    }

    #[test]
    fn test_quantize_roundtrip() {
        for bpp in ALL_DEPTHS {
            let depth = bpp.bits();
            let pixels: Vec<u8> = (0..=255u16).map(|v| v as u8).collect();
            let row = pack_row(&pixels, bpp);
            let unpacked = unpack_row(&row.bytes, pixels.len(), bpp);
            for (&original, &got) in pixels.iter().zip(&unpacked) {
                assert_eq!(got, original >> (8 - depth));
            }
        }
    }

    #[test]
    fn test_empty_row() {
        let row = pack_row(&[], Bpp::Four);
        assert!(row.bytes.is_empty());
        assert!(row.preview.is_empty());
    }

    #[test]
    fn test_preview_levels() {
        // 1 bpp previews use only '.' and '1'
        assert_eq!(pack_row(&[0, 255], Bpp::One).preview, ".1");
        // 8 bpp collapses to 4 levels
        assert_eq!(pack_row(&[0, 64, 128, 255], Bpp::Eight).preview, ".123");
    }
}
