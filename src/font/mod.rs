//! Font rasterization
//!
//! Handles:
//! - TTF/OTF face loading and sizing (freetype)
//! - Glyph rendering to tightly packed 8-bit grayscale
//! - Kerning lookup
//! - The driver that feeds rendered glyphs to the export builder

pub mod driver;
pub mod freetype;

pub use driver::{export_font, CodepointRange};
pub use freetype::FtFont;
