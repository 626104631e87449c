//! Export error types

use crate::export::builder::BuilderState;
use thiserror::Error;

/// Errors surfaced by the export builder.
///
/// `IllegalEvent` is a caller-contract violation (a bug in the driver) and
/// is kept distinct from data errors so it can never be mistaken for bad
/// font input. I/O failures are fatal to the session; the builder drops all
/// session resources, but partial output files may remain on disk.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A builder event was issued outside its legal state
    #[error("builder event {event} is illegal in state {state:?}")]
    IllegalEvent {
        event: &'static str,
        state: BuilderState,
    },

    /// A range with last < first
    #[error("range 0x{first:04X}-0x{last:04X} is empty or reversed")]
    EmptyRange { first: u32, last: u32 },

    /// Ranges must arrive in ascending, non-overlapping order
    #[error(
        "range 0x{first:04X}-0x{last:04X} does not come after the \
         previous range (which ended at 0x{prev_last:04X})"
    )]
    RangeOrder {
        first: u32,
        last: u32,
        prev_last: u32,
    },

    /// Resource acquisition or artifact write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
