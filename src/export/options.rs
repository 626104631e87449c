//! `start_font` option string parsing
//!
//! The builder accepts a comma separated list of `key=value` pairs.
//! Recognized keys: `format` (`array` | `bin`) and `binpath` (directory
//! prefix for the external blob). Unknown keys, unknown values and
//! malformed pairs are ignored, lenient by design.

use log::debug;
use std::path::MAIN_SEPARATOR;

/// Bitmap storage policy, fixed for one export session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageFormat {
    /// Packed bytes embedded as a literal table in the artifact
    #[default]
    Array,
    /// Packed bytes written to a separate binary file
    Bin,
}

/// Options recognized in the `start_font` option string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    pub format: StorageFormat,
    /// Directory prefix for the external blob, always separator-terminated
    /// when non-empty
    pub binpath: String,
}

impl BuilderOptions {
    /// Parse a comma separated `key=value` option string.
    pub fn parse(raw: &str) -> Self {
        let mut options = Self::default();
        for pair in raw.split(',').filter(|pair| !pair.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                debug!("ignoring malformed option {:?}", pair);
                continue;
            };
            match key {
                "format" => match value {
                    "array" => options.format = StorageFormat::Array,
                    "bin" => options.format = StorageFormat::Bin,
                    _ => debug!("ignoring unknown format {:?}", value),
                },
                "binpath" => {
                    if value.is_empty() {
                        continue;
                    }
                    options.binpath = value.to_string();
                    if !value.ends_with('/') && !value.ends_with(MAIN_SEPARATOR) {
                        options.binpath.push(MAIN_SEPARATOR);
                    }
                }
                _ => debug!("ignoring unknown option key {:?}", key),
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BuilderOptions::parse("");
        assert_eq!(options.format, StorageFormat::Array);
        assert!(options.binpath.is_empty());
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(
            BuilderOptions::parse("format=array").format,
            StorageFormat::Array
        );
        assert_eq!(
            BuilderOptions::parse("format=bin").format,
            StorageFormat::Bin
        );
    }

    #[test]
    fn test_binpath_separator_appended() {
        let options = BuilderOptions::parse("format=bin,binpath=blobs");
        assert_eq!(options.binpath, format!("blobs{}", MAIN_SEPARATOR));
    }

    #[test]
    fn test_binpath_separator_kept() {
        let options = BuilderOptions::parse("binpath=blobs/");
        assert_eq!(options.binpath, "blobs/");
    }

    #[test]
    fn test_unknown_keys_and_values_ignored() {
        let options = BuilderOptions::parse("format=xml,color=blue,format=bin");
        assert_eq!(options.format, StorageFormat::Bin);
    }

    #[test]
    fn test_malformed_pairs_ignored() {
        let options = BuilderOptions::parse("format,,=bin,binpath=,format=bin");
        assert_eq!(options.format, StorageFormat::Bin);
        assert!(options.binpath.is_empty());
    }
}
