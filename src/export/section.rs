//! Staging sections and final assembly
//!
//! Each output category is accumulated in its own append-only buffer while
//! events arrive, then concatenated into the single artifact at the end of
//! the session. The bitmap section is staged separately by the selected
//! bitmap store.

/// The four text sections staged independently during one session.
///
/// Buffers are append-only: once a record is committed it is never
/// rewritten. The font section's trailing count fields are appended exactly
/// once, right before assembly.
#[derive(Debug, Default)]
pub struct Sections {
    pub characters: String,
    pub ranges: String,
    pub kerning: String,
    pub font: String,
}

impl Sections {
    /// Concatenate the staged sections into the final artifact.
    ///
    /// The order is a compatibility requirement for existing consumers of
    /// the generated source and is independent of the storage format:
    /// inline bitmap table (array storage only), character sub-tables,
    /// range table, kerning table (only when pairs were recorded), font
    /// record.
    pub fn assemble(&self, inline_bitmap: Option<&str>) -> String {
        let mut artifact = String::new();
        if let Some(bitmap) = inline_bitmap {
            artifact.push_str(bitmap);
            artifact.push_str("\n\n");
        }
        artifact.push_str(&self.characters);
        artifact.push_str("\n\n");
        artifact.push_str(&self.ranges);
        artifact.push_str("\n\n");
        if !self.kerning.is_empty() {
            artifact.push_str(&self.kerning);
            artifact.push_str("\n\n");
        }
        artifact.push_str(&self.font);
        artifact
    }
}
