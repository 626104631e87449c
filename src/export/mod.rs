//! Font export pipeline
//!
//! Receives one glyph / range / kerning pair at a time from the
//! rasterization driver and assembles a C source table of packed bitmaps,
//! metrics, and kerning pairs:
//! - event-driven builder state machine (`builder`)
//! - variable-bit-depth pixel packing (`packer`)
//! - append-only staging sections and final assembly (`section`)
//! - inline-array vs external-blob bitmap storage (`store`)

pub mod builder;
pub mod error;
pub mod options;
pub mod packer;
pub mod section;
pub mod store;

pub use builder::{CSourceBuilder, CharacterInfo, FontInfo};
pub use error::ExportError;
pub use packer::Bpp;
