//! fontpack - convert TTF/OTF fonts into compact C tables
//!
//! Rasterizes the requested codepoint ranges with FreeType, packs the
//! glyph bitmaps at 1/2/4/8 bpp, and emits a C source table plus companion
//! header ready to compile into an embedded image. Bitmap bytes are either
//! embedded as a literal array or written to an external binary blob.

mod export;
mod font;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use export::builder::CSourceBuilder;
use export::packer::Bpp;
use font::{export_font, CodepointRange, FtFont};

#[derive(clap::Parser, Debug)]
#[command(
    name = "fontpack",
    version,
    about = "Convert TTF/OTF fonts into compact C tables for embedded targets"
)]
struct Args {
    /// Input font file (TTF/OTF)
    font: PathBuf,

    /// Output path without extension; <OUTPUT>.c and <OUTPUT>.h are written
    #[arg(short, long)]
    output: PathBuf,

    /// Bits per pixel for the packed bitmaps (1, 2, 4 or 8)
    #[arg(short, long, default_value_t = 4)]
    bpp: u8,

    /// Pixel height of the scaled EM square
    #[arg(short, long, default_value_t = 30)]
    size: u32,

    /// Comma separated codepoint ranges, e.g. 32-126,0x3042-0x3093
    #[arg(short, long)]
    ranges: String,

    /// Bitmap storage: inline array or external binary blob
    #[arg(long, default_value = "array", value_parser = ["array", "bin"])]
    format: String,

    /// Directory prefix for the external blob (bin format only)
    #[arg(long)]
    binpath: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let bpp = Bpp::from_u8(args.bpp)
        .ok_or_else(|| anyhow!("{} is not a valid bit depth (use 1, 2, 4 or 8)", args.bpp))?;
    let ranges = parse_ranges(&args.ranges)?;

    // 1 bpp exports render in monochrome, everything else in grayscale
    let face = FtFont::open(&args.font, args.size, bpp == Bpp::One)?;

    let mut options = format!("format={}", args.format);
    if let Some(binpath) = &args.binpath {
        options.push_str(&format!(",binpath={}", binpath));
    }

    let mut builder = CSourceBuilder::new();
    export_font(&face, &ranges, bpp, &args.output, &options, &mut builder)
        .with_context(|| format!("export to {} failed", args.output.display()))?;

    Ok(())
}

/// Parse a comma separated range list: `first-last` intervals or single
/// codepoints, decimal or `0x` hex.
fn parse_ranges(raw: &str) -> Result<Vec<CodepointRange>> {
    let mut ranges = Vec::new();
    for part in raw.split(',').filter(|part| !part.is_empty()) {
        let (first, last) = match part.split_once('-') {
            Some((first, last)) => (parse_codepoint(first)?, parse_codepoint(last)?),
            None => {
                let only = parse_codepoint(part)?;
                (only, only)
            }
        };
        if first > last {
            bail!("range {} is reversed", part);
        }
        ranges.push(CodepointRange { first, last });
    }
    if ranges.is_empty() {
        bail!("at least one codepoint range is required");
    }
    Ok(ranges)
}

fn parse_codepoint(raw: &str) -> Result<u32> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| anyhow!("{} is not a valid codepoint", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codepoint() {
        assert_eq!(parse_codepoint("32").unwrap(), 32);
        assert_eq!(parse_codepoint("0x41").unwrap(), 0x41);
        assert_eq!(parse_codepoint("0X3042").unwrap(), 0x3042);
        assert_eq!(parse_codepoint(" 65 ").unwrap(), 65);
        assert!(parse_codepoint("xyz").is_err());
        assert!(parse_codepoint("").is_err());
    }

    #[test]
    fn test_parse_ranges() {
        let ranges = parse_ranges("32-126,0x3042-0x3093,1020").unwrap();
        assert_eq!(
            ranges,
            vec![
                CodepointRange {
                    first: 32,
                    last: 126
                },
                CodepointRange {
                    first: 0x3042,
                    last: 0x3093
                },
                CodepointRange {
                    first: 1020,
                    last: 1020
                },
            ]
        );
    }

    #[test]
    fn test_parse_ranges_rejects_bad_input() {
        assert!(parse_ranges("").is_err());
        assert!(parse_ranges("126-32").is_err());
        assert!(parse_ranges("a-b").is_err());
    }
}
