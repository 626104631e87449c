//! Export driver
//!
//! Walks the requested codepoint ranges and feeds the builder the fixed
//! event sequence: `start_font`, then per range `start_range`, per glyph
//! `start_character` / `put_kerning`* / `end_character`, `end_range`, and
//! finally `end_font`.

use crate::export::builder::{CSourceBuilder, CharacterInfo, FontInfo};
use crate::export::packer::Bpp;
use crate::font::freetype::FtFont;
use anyhow::Result;
use log::{debug, trace};
use std::path::Path;

/// Inclusive codepoint interval requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodepointRange {
    pub first: u32,
    pub last: u32,
}

/// Run one export session against a sized face.
///
/// Codepoints without a glyph in the face are skipped; the range record
/// still advertises the full `last - first + 1` character count.
pub fn export_font(
    face: &FtFont,
    ranges: &[CodepointRange],
    bpp: Bpp,
    output: &Path,
    options: &str,
    builder: &mut CSourceBuilder,
) -> Result<()> {
    let metrics = face.metrics()?;
    let font = FontInfo {
        family_name: face.family_name(),
        style_name: face.style_name(),
        bpp,
        pxl_baseline_to_baseline: metrics.pxl_baseline_to_baseline,
        pxl_max_glyph_height: metrics.pxl_max_glyph_height,
    };
    builder.start_font(&font, output, options)?;

    let kerning_available = face.has_kerning();

    for range in ranges {
        builder.start_range(range.first, range.last)?;
        for codepoint in range.first..=range.last {
            let Some(glyph) = face.rasterize(codepoint)? else {
                debug!("no glyph for U+{:04X}, skipped", codepoint);
                continue;
            };
            trace!(
                "U+{:04X}: {}x{} advance {}",
                codepoint,
                glyph.width,
                glyph.height,
                glyph.pxl_advance
            );

            let character = CharacterInfo {
                codepoint,
                pixels: &glyph.pixels,
                bmp_pxl_width: glyph.width as u16,
                bmp_pxl_height: glyph.height as u16,
                pxl_advance: glyph.pxl_advance as u16,
                pxl_left: glyph.pxl_left as i16,
                pxl_top: glyph.pxl_top as i16,
            };
            builder.start_character(&character)?;
            if kerning_available {
                export_kerning(face, codepoint, ranges, builder)?;
            }
            builder.end_character()?;
        }
        builder.end_range()?;
    }

    builder.end_font()?;
    Ok(())
}

/// Record every non-zero kerning adjustment between `left` and each other
/// exported codepoint as the right glyph.
fn export_kerning(
    face: &FtFont,
    left: u32,
    ranges: &[CodepointRange],
    builder: &mut CSourceBuilder,
) -> Result<()> {
    let Some(left_index) = face.glyph_index(left) else {
        return Ok(());
    };
    for range in ranges {
        for right in range.first..=range.last {
            let Some(right_index) = face.glyph_index(right) else {
                continue;
            };
            let adjust = face.kerning(left_index, right_index);
            if adjust != 0 {
                builder.put_kerning(left, right, adjust as i16)?;
            }
        }
    }
    Ok(())
}
