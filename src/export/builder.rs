//! Builder state machine
//!
//! Enforces the legal event sequence
//! `start_font { start_range { start_character { put_kerning }* end_character }+ end_range }+ end_font`
//! and routes each event to the pixel packer and the staging sections. On
//! `end_font` the staged sections are assembled, in fixed order, into the
//! generated C source.
//!
//! All session state lives in one owned object; counters (range index,
//! bitmap byte offset, kerning pair count) increase monotonically across
//! the whole session and are never reset between ranges.

use crate::export::error::ExportError;
use crate::export::options::{BuilderOptions, StorageFormat};
use crate::export::packer::{pack_row, Bpp};
use crate::export::section::Sections;
use crate::export::store::{BitmapStore, ExternalBlobStore, InlineArrayStore};
use log::{debug, info};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// C type names used in the generated source
const C_TYPE_FONT: &str = "fontpack_Font_t";
const C_TYPE_RANGE: &str = "fontpack_Range_t";
const C_TYPE_CHARACTER: &str = "fontpack_Character_t";
const C_TYPE_KERNING: &str = "fontpack_Kerning_t";

/// Export session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderState {
    #[default]
    Idle,
    FontOpen,
    RangeOpen,
    CharacterOpen,
}

/// Immutable font characteristics for one export session
#[derive(Debug, Clone)]
pub struct FontInfo {
    pub family_name: String,
    pub style_name: String,
    pub bpp: Bpp,
    pub pxl_baseline_to_baseline: u16,
    pub pxl_max_glyph_height: u16,
}

/// One rasterized glyph handed to the builder
#[derive(Debug)]
pub struct CharacterInfo<'a> {
    pub codepoint: u32,
    /// Tightly packed 8-bit grayscale samples, row major, width * height
    pub pixels: &'a [u8],
    pub bmp_pxl_width: u16,
    pub bmp_pxl_height: u16,
    pub pxl_advance: u16,
    pub pxl_left: i16,
    pub pxl_top: i16,
}

/// Everything owned by one session, dropped as a unit on completion or on
/// the first fatal error
struct Session {
    source: File,
    store: Box<dyn BitmapStore>,
    sections: Sections,
    symbol: String,
    bpp: Bpp,
    range_index: u16,
    /// Last codepoint of the previous range, for order validation
    prev_last: Option<u32>,
    bmp_offset: u32,
    kerning_count: u32,
}

/// Event-driven builder producing a C source table (and companion header)
/// from one export session.
#[derive(Default)]
pub struct CSourceBuilder {
    state: BuilderState,
    session: Option<Session>,
}

impl CSourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session: create `<output>.c` and `<output>.h`, pick the
    /// bitmap storage policy from the option string, and stage the leading
    /// font record fields.
    pub fn start_font(
        &mut self,
        font: &FontInfo,
        output: &Path,
        options: &str,
    ) -> Result<(), ExportError> {
        if self.state != BuilderState::Idle {
            return Err(ExportError::IllegalEvent {
                event: "start_font",
                state: self.state,
            });
        }

        let options = BuilderOptions::parse(options);
        let stem = output
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "font".to_string());
        let symbol = sanitize_symbol(&stem);

        write_companion_header(&output.with_extension("h"), &symbol)?;

        let mut source = File::create(output.with_extension("c"))?;
        writeln!(
            source,
            "// Generated by fontpack from {} {}. Do not edit.",
            font.family_name, font.style_name
        )?;
        writeln!(source, "#include \"fontpack.h\"")?;
        writeln!(source)?;

        let store: Box<dyn BitmapStore> = match options.format {
            StorageFormat::Array => Box::new(InlineArrayStore::new(&symbol)),
            StorageFormat::Bin => {
                let blob_path = if options.binpath.is_empty() {
                    output.with_extension("bin")
                } else {
                    PathBuf::from(format!("{}{}.bin", options.binpath, stem))
                };
                debug!("external bitmap blob: {}", blob_path.display());
                Box::new(ExternalBlobStore::create(&blob_path)?)
            }
        };

        let mut sections = Sections::default();
        sections.font.push_str(&format!(
            "// {} {} - {} bpp\n",
            font.family_name,
            font.style_name,
            font.bpp.bits()
        ));
        sections
            .font
            .push_str(&format!("const {} {} =\n", C_TYPE_FONT, symbol));
        sections.font.push_str("{\n");
        sections
            .font
            .push_str(&format!("\t.bpp = {},\n", font.bpp.bits()));
        sections.font.push_str(&format!(
            "\t.pxl_baseline_to_baseline = {},\n",
            font.pxl_baseline_to_baseline
        ));
        sections.font.push_str(&format!(
            "\t.pxl_max_glyph_height = {},\n",
            font.pxl_max_glyph_height
        ));
        sections.font.push_str(&format!(
            "\t.bitmaps_table = {},\n",
            store.table_initializer()
        ));
        sections.font.push_str(&format!(
            "\t.bitmaps_table_storage = {},\n",
            store.storage_token()
        ));
        sections
            .font
            .push_str(&format!("\t.ranges = {}_Ranges,\n", symbol));

        sections
            .ranges
            .push_str(&format!("const {} {}_Ranges[] =\n", C_TYPE_RANGE, symbol));
        sections.ranges.push_str("{\n");

        info!(
            "exporting {} {} at {} bpp to {}",
            font.family_name,
            font.style_name,
            font.bpp.bits(),
            output.display()
        );

        self.session = Some(Session {
            source,
            store,
            sections,
            symbol,
            bpp: font.bpp,
            range_index: 0,
            prev_last: None,
            bmp_offset: 0,
            kerning_count: 0,
        });
        self.state = BuilderState::FontOpen;
        Ok(())
    }

    /// Open a codepoint range: emit its range record and the header of its
    /// character sub-table. Ranges must arrive in ascending,
    /// non-overlapping order.
    pub fn start_range(&mut self, first: u32, last: u32) -> Result<(), ExportError> {
        let session = match (self.state, self.session.as_mut()) {
            (BuilderState::FontOpen, Some(session)) => session,
            (state, _) => {
                return Err(ExportError::IllegalEvent {
                    event: "start_range",
                    state,
                })
            }
        };

        if last < first {
            return Err(ExportError::EmptyRange { first, last });
        }
        if let Some(prev_last) = session.prev_last {
            if first <= prev_last {
                return Err(ExportError::RangeOrder {
                    first,
                    last,
                    prev_last,
                });
            }
        }

        let num_characters = last - first + 1;
        session.sections.ranges.push_str(&format!(
            "\t{{ .first = 0x{:04X}, .num_characters = {}, .characters = {}_Characters{} }},\n",
            first, num_characters, session.symbol, session.range_index
        ));

        if session.range_index > 0 {
            session.sections.characters.push('\n');
        }
        session.sections.characters.push_str(&format!(
            "const {} {}_Characters{}[] =\n",
            C_TYPE_CHARACTER, session.symbol, session.range_index
        ));
        session.sections.characters.push_str(&format!(
            "{{\t// character range [0x{:04X}-0x{:04X}] ({} characters)\n",
            first, last, num_characters
        ));

        debug!(
            "range {}: 0x{:04X}-0x{:04X} ({} characters)",
            session.range_index, first, last, num_characters
        );

        session.prev_last = Some(last);
        self.state = BuilderState::RangeOpen;
        Ok(())
    }

    /// Emit one character record and pack its bitmap. The record carries
    /// the cumulative bitmap offset and the index of the character's first
    /// kerning pair; the offset then advances by the exact packed byte
    /// count.
    pub fn start_character(&mut self, character: &CharacterInfo) -> Result<(), ExportError> {
        let session = match (self.state, self.session.as_mut()) {
            (BuilderState::RangeOpen, Some(session)) => session,
            (state, _) => {
                return Err(ExportError::IllegalEvent {
                    event: "start_character",
                    state,
                })
            }
        };

        let width = character.bmp_pxl_width as usize;
        debug_assert_eq!(
            character.pixels.len(),
            width * character.bmp_pxl_height as usize
        );

        session.sections.characters.push_str(&format!(
            "\t{{ .bmp_offset = {:7}, .bmp_pxl_width = {:3}, .bmp_pxl_height = {:3}, \
             .pxl_advance = {:3}, .pxl_left = {:4}, .pxl_top = {:4}, .kerning_index = {:5} }}, // U+{:04X}\n",
            session.bmp_offset,
            character.bmp_pxl_width,
            character.bmp_pxl_height,
            character.pxl_advance,
            character.pxl_left,
            character.pxl_top,
            session.kerning_count,
            character.codepoint
        ));

        session.store.begin_glyph(character.codepoint);
        if width > 0 {
            for row_pixels in character.pixels.chunks_exact(width) {
                let row = pack_row(row_pixels, session.bpp);
                session.bmp_offset += row.bytes.len() as u32;
                session.store.put_row(&row);
            }
        }
        session.store.end_glyph();

        self.state = BuilderState::CharacterOpen;
        Ok(())
    }

    /// Append one kerning record for the currently open character. The
    /// driver only reports non-zero adjustments; records are stored in call
    /// order without deduplication.
    pub fn put_kerning(&mut self, left: u32, right: u32, adjust: i16) -> Result<(), ExportError> {
        let session = match (self.state, self.session.as_mut()) {
            (BuilderState::CharacterOpen, Some(session)) => session,
            (state, _) => {
                return Err(ExportError::IllegalEvent {
                    event: "put_kerning",
                    state,
                })
            }
        };

        if session.kerning_count == 0 {
            session.sections.kerning.push_str(&format!(
                "const {} {}_Kerning[] =\n",
                C_TYPE_KERNING, session.symbol
            ));
            session.sections.kerning.push_str("{\n");
        }
        session.sections.kerning.push_str(&format!(
            "\t{{ .left_ch = 0x{:04X}, .right_ch = 0x{:04X}, .pxl_adjust = {} }},\n",
            left, right, adjust
        ));
        session.kerning_count += 1;
        Ok(())
    }

    /// Close the current character
    pub fn end_character(&mut self) -> Result<(), ExportError> {
        match (self.state, self.session.as_ref()) {
            (BuilderState::CharacterOpen, Some(_)) => {
                self.state = BuilderState::RangeOpen;
                Ok(())
            }
            (state, _) => Err(ExportError::IllegalEvent {
                event: "end_character",
                state,
            }),
        }
    }

    /// Close the current range's character sub-table and advance the range
    /// index
    pub fn end_range(&mut self) -> Result<(), ExportError> {
        let session = match (self.state, self.session.as_mut()) {
            (BuilderState::RangeOpen, Some(session)) => session,
            (state, _) => {
                return Err(ExportError::IllegalEvent {
                    event: "end_range",
                    state,
                })
            }
        };

        session.sections.characters.push_str("};\n");
        session.range_index += 1;
        self.state = BuilderState::FontOpen;
        Ok(())
    }

    /// Finalize the session: fill the trailing font record counts, close
    /// the bitmap store, assemble the sections in fixed order and write the
    /// artifact. The builder returns to `Idle`; on error the session is
    /// still torn down and its resources released.
    pub fn end_font(&mut self) -> Result<(), ExportError> {
        let mut session = match self.session.take() {
            Some(session) if self.state == BuilderState::FontOpen => session,
            other => {
                self.session = other;
                return Err(ExportError::IllegalEvent {
                    event: "end_font",
                    state: self.state,
                });
            }
        };
        // a failure past this point is fatal to the session
        self.state = BuilderState::Idle;

        session.sections.ranges.push_str("};\n");
        if session.kerning_count > 0 {
            session.sections.kerning.push_str("};\n");
            session
                .sections
                .font
                .push_str(&format!("\t.kerning = {}_Kerning,\n", session.symbol));
        } else {
            session.sections.font.push_str("\t.kerning = NULL,\n");
        }
        session
            .sections
            .font
            .push_str(&format!("\t.num_kerning = {},\n", session.kerning_count));
        session
            .sections
            .font
            .push_str(&format!("\t.num_ranges = {},\n", session.range_index));
        session.sections.font.push_str("};\n");

        let inline_bitmap = session.store.finish()?;
        let artifact = session.sections.assemble(inline_bitmap.as_deref());
        session.source.write_all(artifact.as_bytes())?;
        session.source.flush()?;

        info!(
            "export finished: {} ranges, {} kerning pairs, {} bitmap bytes",
            session.range_index, session.kerning_count, session.bmp_offset
        );
        Ok(())
    }
}

/// Turn an output file stem into a valid C identifier
fn sanitize_symbol(stem: &str) -> String {
    let mut symbol: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if symbol.is_empty() || symbol.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.insert(0, '_');
    }
    symbol
}

/// Write the companion header declaring the font record's external symbol.
/// Produced once per session, independent of the staged sections.
fn write_companion_header(path: &Path, symbol: &str) -> std::io::Result<()> {
    let guard = format!("FONTPACK_{}_H_INCLUDED", symbol.to_uppercase());
    let mut header = File::create(path)?;
    writeln!(header, "// Generated by fontpack. Do not edit.")?;
    writeln!(header, "#ifndef {}", guard)?;
    writeln!(header, "#define {}", guard)?;
    writeln!(header)?;
    writeln!(header, "#include \"fontpack.h\"")?;
    writeln!(header)?;
    writeln!(header, "extern const {} {};", C_TYPE_FONT, symbol)?;
    writeln!(header)?;
    writeln!(header, "#endif // {}", guard)?;
    Ok(())
}
