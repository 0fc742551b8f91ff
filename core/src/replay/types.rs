//! Core types for the replay decoder
//!
//! Every decoded value borrows from the caller's capture buffer. Nothing here
//! copies payload bytes; a [`Cycle`] is three slices plus the bookkeeping the
//! scanner computed while finding them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::binary::{
    COMMAND_AUX_LEN, COMMAND_COUNT_OFFSET, COMMAND_TAG_LEN, PLAYER_ID_OFFSET, SYNC_HEADER_LEN,
};

/// Player identifier carried by every command record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 4-byte command code (e.g. `GCEE`, `GCEN`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandTag(pub [u8; COMMAND_TAG_LEN]);

impl CommandTag {
    /// Raw tag bytes
    pub fn as_bytes(&self) -> &[u8; COMMAND_TAG_LEN] {
        &self.0
    }
}

impl fmt::Display for CommandTag {
    /// Printable ASCII is written verbatim, anything else as `\xNN`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02X}", b)?;
            }
        }
        Ok(())
    }
}

/// Error returned when a string is not a valid 4-byte command tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("command tag must be exactly {COMMAND_TAG_LEN} bytes, got {0:?}")]
pub struct ParseTagError(pub String);

impl FromStr for CommandTag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; COMMAND_TAG_LEN] = s
            .as_bytes()
            .try_into()
            .map_err(|_| ParseTagError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for CommandTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CommandTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One decoded tick: an RSYN header, a SYNC block and an RTOK trailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<'a> {
    /// 1-based position among the cycles found in the stream
    pub index: u64,
    /// Byte offset of the RSYN marker in the capture
    pub offset: usize,
    /// Header activity byte equals the empty-tick sentinel
    pub is_empty: bool,
    /// 8-byte RSYN header (marker, 3 header bytes, padding)
    pub header: &'a [u8],
    /// Declared-length SYNC block
    pub sync_block: SyncBlock<'a>,
    /// 18-byte RTOK trailer
    pub trailer: &'a [u8],
}

impl Cycle<'_> {
    /// Total bytes covered by this cycle
    pub fn span_len(&self) -> usize {
        self.header.len() + self.sync_block.total_length() + self.trailer.len()
    }

    /// Offset of the first byte after the trailer
    pub fn end_offset(&self) -> usize {
        self.offset + self.span_len()
    }
}

/// The SYNC sub-block of a cycle: 12-byte header plus a body of command records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncBlock<'a> {
    offset: usize,
    bytes: &'a [u8],
}

impl<'a> SyncBlock<'a> {
    /// Wrap a SYNC region. The scanner guarantees `bytes.len() >= SYNC_HEADER_LEN`.
    pub(crate) fn new(offset: usize, bytes: &'a [u8]) -> Self {
        debug_assert!(bytes.len() >= SYNC_HEADER_LEN);
        Self { offset, bytes }
    }

    /// Absolute offset of the SYNC marker
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whole block, header included
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Declared length taken from the RSYN header
    pub fn total_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn header(&self) -> &'a [u8] {
        &self.bytes[..SYNC_HEADER_LEN]
    }

    pub fn body(&self) -> &'a [u8] {
        &self.bytes[SYNC_HEADER_LEN..]
    }

    /// Absolute offset of the first body byte
    pub fn body_offset(&self) -> usize {
        self.offset + SYNC_HEADER_LEN
    }

    /// Number of command records declared in the header
    pub fn command_count(&self) -> usize {
        self.bytes[COMMAND_COUNT_OFFSET] as usize
    }

    /// Width of one record, or `None` when the block declares no commands.
    ///
    /// Returns `None` as well if the division is not exact; the extractor
    /// reports that case as a structural error.
    pub fn record_width(&self) -> Option<usize> {
        let count = self.command_count();
        let body = self.body().len();
        (count > 0 && body % count == 0).then(|| body / count)
    }
}

/// One fixed-width entry of a SYNC body
///
/// Only the tag and the player byte have a known meaning. The auxiliary
/// field and the rest of the trailing region are exposed as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord<'a> {
    /// Position of this record within its SYNC body
    pub index: usize,
    /// Absolute offset of the record's first byte
    pub offset: usize,
    bytes: &'a [u8],
}

impl<'a> CommandRecord<'a> {
    /// Wrap a record slice. The extractor guarantees `bytes.len() >= MIN_RECORD_LEN`.
    pub(crate) fn new(index: usize, offset: usize, bytes: &'a [u8]) -> Self {
        debug_assert!(bytes.len() >= super::binary::MIN_RECORD_LEN);
        Self {
            index,
            offset,
            bytes,
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn tag(&self) -> CommandTag {
        let mut tag = [0u8; COMMAND_TAG_LEN];
        tag.copy_from_slice(&self.bytes[..COMMAND_TAG_LEN]);
        CommandTag(tag)
    }

    /// Four command-specific bytes following the tag
    pub fn auxiliary(&self) -> &'a [u8] {
        &self.bytes[COMMAND_TAG_LEN..COMMAND_TAG_LEN + COMMAND_AUX_LEN]
    }

    /// Everything after the auxiliary field
    pub fn trailing(&self) -> &'a [u8] {
        &self.bytes[COMMAND_TAG_LEN + COMMAND_AUX_LEN..]
    }

    pub fn player_id(&self) -> PlayerId {
        PlayerId(self.trailing()[PLAYER_ID_OFFSET])
    }
}

/// Raw bytes of the three regions of a cycle, kept for diagnostics
///
/// Regions are clipped to the end of the buffer, so a truncated capture
/// still produces whatever bytes were available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRegions {
    pub header: Vec<u8>,
    pub sync: Vec<u8>,
    pub trailer: Vec<u8>,
}

impl fmt::Display for RawRegions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RSYN len({}) {:?}", self.header.len(), self.header)?;
        writeln!(f, "SYNC len({}) {:?}", self.sync.len(), self.sync)?;
        write!(f, "RTOK len({}) {:?}", self.trailer.len(), self.trailer)
    }
}
