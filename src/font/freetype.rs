//! FreeType wrapper
//!
//! Loads a font face at a fixed pixel size and rasterizes glyphs to tightly
//! packed 8-bit grayscale bitmaps, independent of the export bit depth.
//! 1 bpp exports render in monochrome so FreeType's mono rasterizer decides
//! pixel coverage instead of a later threshold.

use anyhow::{anyhow, Result};
use freetype::bitmap::{Bitmap, PixelMode};
use freetype::face::{KerningMode, LoadFlag};
use freetype::render_mode::RenderMode;
use freetype::Library;
use log::info;
use std::path::Path;

/// Pixel metrics shared by every glyph of a sized face
#[derive(Debug, Clone, Copy)]
pub struct FaceMetrics {
    /// Cursor y advance for a new line
    pub pxl_baseline_to_baseline: u16,
    /// Ascender minus descender
    pub pxl_max_glyph_height: u16,
}

/// One rasterized glyph: pixels plus placement metrics
#[derive(Debug)]
pub struct RasterGlyph {
    /// Tightly packed 8-bit grayscale samples, row major, no row padding
    pub pixels: Vec<u8>,
    /// Bitmap width (pixels)
    pub width: u32,
    /// Bitmap height (pixels)
    pub height: u32,
    /// Bitmap left edge relative to the pen position
    pub pxl_left: i32,
    /// Bitmap top edge relative to the pen position
    pub pxl_top: i32,
    /// Horizontal advance to the next character (whole pixels)
    pub pxl_advance: u32,
}

/// FreeType font face scaled to one pixel size
pub struct FtFont {
    // the library must outlive the face
    _library: Library,
    face: freetype::Face,
    mono: bool,
}

impl FtFont {
    /// Open a font file and scale it to the given EM square pixel size
    pub fn open(path: &Path, size_px: u32, mono: bool) -> Result<Self> {
        let library =
            Library::init().map_err(|e| anyhow!("FreeType initialization failed: {:?}", e))?;

        let face = library
            .new_face(path, 0)
            .map_err(|e| anyhow!("cannot open font face {}: {:?}", path.display(), e))?;

        face.set_pixel_sizes(0, size_px)
            .map_err(|e| anyhow!("FreeType size setting failed: {:?}", e))?;

        let font = Self {
            _library: library,
            face,
            mono,
        };
        info!(
            "loaded {} {} at {}px{}",
            font.family_name(),
            font.style_name(),
            size_px,
            if mono { " (mono)" } else { "" }
        );
        Ok(font)
    }

    pub fn family_name(&self) -> String {
        self.face
            .family_name()
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn style_name(&self) -> String {
        self.face
            .style_name()
            .unwrap_or_else(|| "Regular".to_string())
    }

    /// Line and height metrics in whole pixels
    pub fn metrics(&self) -> Result<FaceMetrics> {
        let metrics = self
            .face
            .size_metrics()
            .ok_or_else(|| anyhow!("face has no size metrics"))?;
        Ok(FaceMetrics {
            pxl_baseline_to_baseline: (metrics.height >> 6) as u16,
            pxl_max_glyph_height: ((metrics.ascender - metrics.descender) >> 6) as u16,
        })
    }

    /// Glyph index for a codepoint; `None` when the face has no glyph for it
    pub fn glyph_index(&self, codepoint: u32) -> Option<u32> {
        match self.face.get_char_index(codepoint as usize) {
            None | Some(0) => None,
            index => index,
        }
    }

    /// Rasterize one codepoint. Returns `None` when the face has no glyph
    /// for the codepoint.
    pub fn rasterize(&self, codepoint: u32) -> Result<Option<RasterGlyph>> {
        if self.glyph_index(codepoint).is_none() {
            return Ok(None);
        }

        self.face
            .load_char(codepoint as usize, LoadFlag::DEFAULT)
            .map_err(|e| anyhow!("glyph load failed for U+{:04X}: {:?}", codepoint, e))?;

        let glyph = self.face.glyph();
        let render_mode = if self.mono {
            RenderMode::Mono
        } else {
            RenderMode::Normal
        };
        glyph
            .render_glyph(render_mode)
            .map_err(|e| anyhow!("glyph render failed for U+{:04X}: {:?}", codepoint, e))?;

        let bitmap = glyph.bitmap();
        let width = bitmap.width() as u32;
        let height = bitmap.rows() as u32;
        let pixels = expand_to_gray8(&bitmap)?;

        Ok(Some(RasterGlyph {
            pixels,
            width,
            height,
            pxl_left: glyph.bitmap_left(),
            pxl_top: glyph.bitmap_top(),
            pxl_advance: (glyph.advance().x >> 6) as u32,
        }))
    }

    /// True when the face carries a kerning table
    pub fn has_kerning(&self) -> bool {
        self.face.has_kerning()
    }

    /// Horizontal kerning adjustment between two glyph indices, in whole
    /// pixels
    pub fn kerning(&self, left_index: u32, right_index: u32) -> i32 {
        match self
            .face
            .get_kerning(left_index, right_index, KerningMode::KerningDefault)
        {
            Ok(delta) => (delta.x >> 6) as i32,
            Err(_) => 0,
        }
    }
}

/// Normalize a FreeType bitmap to one byte per pixel with no row padding.
/// Mono bitmaps are 1-bit packed and pitch strided; gray bitmaps are 8-bit
/// but still pitch strided.
fn expand_to_gray8(bitmap: &Bitmap) -> Result<Vec<u8>> {
    let width = bitmap.width() as usize;
    let height = bitmap.rows() as usize;
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let buffer = bitmap.buffer();
    let pitch = bitmap.pitch().unsigned_abs() as usize;
    let mut pixels = Vec::with_capacity(width * height);

    match bitmap
        .pixel_mode()
        .map_err(|e| anyhow!("unreadable pixel mode: {:?}", e))?
    {
        PixelMode::Gray => {
            for y in 0..height {
                pixels.extend_from_slice(&buffer[y * pitch..y * pitch + width]);
            }
        }
        PixelMode::Mono => {
            for y in 0..height {
                let row = &buffer[y * pitch..];
                for x in 0..width {
                    let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
                    pixels.push(if bit != 0 { 0xFF } else { 0x00 });
                }
            }
        }
        mode => return Err(anyhow!("unsupported pixel mode {:?}", mode)),
    }

    Ok(pixels)
}
