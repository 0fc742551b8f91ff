//! Structural errors raised while decoding a capture
//!
//! Every variant is fatal for the current decode: once an offset cannot be
//! trusted, nothing after it can be either. Each variant carries the byte
//! offset and the raw bytes of the offending region for inspection.

use super::binary::Marker;
use super::types::RawRegions;

/// A violation of the capture's magic-tag or length-arithmetic invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// A sub-block does not open with its expected magic
    #[error("cycle {cycle} at offset {offset:#x}: {region} marker mismatch\n{regions}")]
    MarkerMismatch {
        /// 1-based index of the failing cycle
        cycle: u64,
        /// Offset of the RSYN marker that started the cycle
        offset: usize,
        /// First region whose magic did not match
        region: Marker,
        /// All three regions as sliced
        regions: RawRegions,
    },

    /// A declared region runs past the end of the buffer
    #[error(
        "cycle {cycle} at offset {offset:#x}: {region} region needs {expected} bytes, \
         only {available} left in buffer"
    )]
    Truncated {
        cycle: u64,
        offset: usize,
        region: Marker,
        /// Bytes the region should cover
        expected: usize,
        /// Bytes remaining from the region start
        available: usize,
        /// Whatever was available of the three regions
        regions: RawRegions,
    },

    /// The declared SYNC length cannot hold the fixed SYNC header
    #[error(
        "cycle {cycle} at offset {offset:#x}: declared SYNC length {declared} is shorter \
         than the {minimum}-byte SYNC header"
    )]
    SyncTooShort {
        cycle: u64,
        offset: usize,
        declared: usize,
        minimum: usize,
        regions: RawRegions,
    },

    /// The SYNC body does not split evenly into the declared number of records
    #[error(
        "SYNC block at offset {offset:#x}: body of {body_len} bytes does not divide into \
         {command_count} records"
    )]
    UnevenRecords {
        /// Offset of the SYNC marker
        offset: usize,
        body_len: usize,
        command_count: usize,
        /// The whole SYNC block
        sync: Vec<u8>,
    },

    /// Records are too narrow to hold a tag, auxiliary field and player id
    #[error(
        "SYNC block at offset {offset:#x}: record width {width} is below the \
         {minimum}-byte minimum ({command_count} records in {body_len} bytes)"
    )]
    RecordTooShort {
        offset: usize,
        width: usize,
        minimum: usize,
        body_len: usize,
        command_count: usize,
        sync: Vec<u8>,
    },

    /// A record does not start with the shared command prefix
    #[error("command {index} at offset {offset:#x} does not start with \"GC\": {record:?}")]
    CommandPrefix {
        /// Position of the record within its SYNC body
        index: usize,
        /// Offset of the record's first byte
        offset: usize,
        record: Vec<u8>,
    },
}

impl StructuralError {
    /// Byte offset at which the problem was detected
    pub fn offset(&self) -> usize {
        match self {
            Self::MarkerMismatch { offset, .. }
            | Self::Truncated { offset, .. }
            | Self::SyncTooShort { offset, .. }
            | Self::UnevenRecords { offset, .. }
            | Self::RecordTooShort { offset, .. }
            | Self::CommandPrefix { offset, .. } => *offset,
        }
    }
}
