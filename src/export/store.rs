//! Bitmap storage policies
//!
//! Packed glyph bytes either become a literal `const char` table inside the
//! generated source (`array`) or a separate binary blob referenced by path
//! (`bin`). The policy is selected once per session and held behind the
//! `BitmapStore` trait.

use crate::export::packer::PackedRow;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Destination for packed bitmap bytes, chosen once at session start
pub trait BitmapStore {
    /// Called before the first row of a glyph
    fn begin_glyph(&mut self, codepoint: u32);
    /// Append one packed row
    fn put_row(&mut self, row: &PackedRow);
    /// Called after the last row of a glyph
    fn end_glyph(&mut self);
    /// Initializer expression for the font record's `bitmaps_table` field
    fn table_initializer(&self) -> String;
    /// Storage enum token for the font record
    fn storage_token(&self) -> &'static str;
    /// Close the store. Returns the inline bitmap section, if any.
    fn finish(&mut self) -> io::Result<Option<String>>;
}

/// Renders packed bytes as a literal byte table with per-glyph comments and
/// a preview column next to each row.
pub struct InlineArrayStore {
    table_name: String,
    text: String,
}

impl InlineArrayStore {
    pub fn new(symbol: &str) -> Self {
        let table_name = format!("{}_Bitmaps", symbol);
        let mut text = String::new();
        text.push_str(&format!("const char {}[] =\n", table_name));
        text.push_str("{\n");
        Self { table_name, text }
    }
}

impl BitmapStore for InlineArrayStore {
    fn begin_glyph(&mut self, codepoint: u32) {
        self.text.push_str(&format!("\t// U+{:04X}\n", codepoint));
    }

    fn put_row(&mut self, row: &PackedRow) {
        self.text.push('\t');
        for byte in &row.bytes {
            self.text.push_str(&format!("0x{:02X}, ", byte));
        }
        self.text.push_str(&format!("// {}\n", row.preview));
    }

    fn end_glyph(&mut self) {
        self.text.push('\n');
    }

    fn table_initializer(&self) -> String {
        self.table_name.clone()
    }

    fn storage_token(&self) -> &'static str {
        "FONTPACK_STORAGE_ARRAY"
    }

    fn finish(&mut self) -> io::Result<Option<String>> {
        self.text.push_str("};\n");
        Ok(Some(std::mem::take(&mut self.text)))
    }
}

/// Accumulates raw packed bytes and writes them to a separate binary file;
/// the generated source references the file by path.
pub struct ExternalBlobStore {
    file: File,
    path: String,
    bytes: Vec<u8>,
}

impl ExternalBlobStore {
    /// Create the blob file up front so acquisition failures surface at
    /// session start.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file,
            path: path.to_string_lossy().into_owned(),
            bytes: Vec::new(),
        })
    }
}

impl BitmapStore for ExternalBlobStore {
    fn begin_glyph(&mut self, _codepoint: u32) {}

    fn put_row(&mut self, row: &PackedRow) {
        self.bytes.extend_from_slice(&row.bytes);
    }

    fn end_glyph(&mut self) {}

    fn table_initializer(&self) -> String {
        format!("\"{}\"", self.path)
    }

    fn storage_token(&self) -> &'static str {
        "FONTPACK_STORAGE_FILE"
    }

    fn finish(&mut self) -> io::Result<Option<String>> {
        self.file.write_all(&self.bytes)?;
        self.file.flush()?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bytes: &[u8], preview: &str) -> PackedRow {
        PackedRow {
            bytes: bytes.to_vec(),
            preview: preview.to_string(),
        }
    }

    #[test]
    fn test_inline_store_renders_table() {
        let mut store = InlineArrayStore::new("demo");
        store.begin_glyph(0x41);
        store.put_row(&row(&[0xF8, 0x00], "32."));
        store.end_glyph();

        assert_eq!(store.table_initializer(), "demo_Bitmaps");
        assert_eq!(store.storage_token(), "FONTPACK_STORAGE_ARRAY");

        let text = store.finish().unwrap().unwrap();
        assert!(text.starts_with("const char demo_Bitmaps[] =\n{\n"));
        assert!(text.contains("\t// U+0041\n"));
        assert!(text.contains("\t0xF8, 0x00, // 32.\n"));
        assert!(text.ends_with("};\n"));
    }

    #[test]
    fn test_blob_store_collects_raw_bytes() {
        let dir = std::env::temp_dir().join(format!("fontpack-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("demo.bin");

        let mut store = ExternalBlobStore::create(&path).unwrap();
        store.begin_glyph(0x41);
        store.put_row(&row(&[0xF8, 0x00], "32."));
        store.put_row(&row(&[0x80], "1."));
        store.end_glyph();

        assert_eq!(store.storage_token(), "FONTPACK_STORAGE_FILE");
        assert!(store.table_initializer().contains("demo.bin"));
        assert!(store.table_initializer().starts_with('"'));

        assert!(store.finish().unwrap().is_none());
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xF8, 0x00, 0x80]);
    }
}
