//! Tick-cycle capture format (RSYN/SYNC/RTOK)
//!
//! A capture is a flat byte buffer. Somewhere after an opaque leading blob,
//! the stream becomes a run of cycles, one per simulation tick:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ RSYN header (8 bytes)                            │
//! │ ├─ magic: "RSYN"                                 │
//! │ ├─ sync_len: u8   (also the activity byte)       │
//! │ ├─ 2 unknown bytes                               │
//! │ └─ padding: u8                                   │
//! ├──────────────────────────────────────────────────┤
//! │ SYNC block (sync_len bytes)                      │
//! │ ├─ header (12 bytes)                             │
//! │ │  ├─ magic: "SYNC"                              │
//! │ │  ├─ 6 unknown bytes                            │
//! │ │  ├─ command_count: u8 (offset 10)              │
//! │ │  └─ 1 unknown byte                             │
//! │ └─ body: command_count records of equal width    │
//! │    ├─ tag: [u8; 4]  ("GC..")                     │
//! │    ├─ auxiliary: [u8; 4]                         │
//! │    └─ trailing: [u8; N]  (player id at [2])      │
//! ├──────────────────────────────────────────────────┤
//! │ RTOK trailer (18 bytes, magic "RTOK")            │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! A tick with no commands carries a bare 12-byte SYNC header, so its
//! `sync_len` is 12. That value doubles as the empty-tick sentinel.

mod extractor;
mod scanner;

use std::fmt;

pub use extractor::{CommandExtractor, CommandList, IndexingPolicy, ParsePolicyError};
pub use scanner::CycleScanner;

/// Size of the fixed SYNC header
pub const SYNC_HEADER_LEN: usize = 12;

/// Offset of the declared SYNC length within the RSYN header
pub const SYNC_LENGTH_OFFSET: usize = 4;

/// Offset of the command count within the SYNC header
pub const COMMAND_COUNT_OFFSET: usize = 10;

/// RSYN activity byte for a tick without commands
pub const EMPTY_TICK_SENTINEL: u8 = 12;

/// Every command tag starts with these two bytes
pub const COMMAND_PREFIX: [u8; 2] = *b"GC";

/// Length of a command tag
pub const COMMAND_TAG_LEN: usize = 4;

/// Length of the opaque field after the tag
pub const COMMAND_AUX_LEN: usize = 4;

/// Player id position within a record's trailing region
pub const PLAYER_ID_OFFSET: usize = 2;

/// Smallest record that still holds a player id
pub const MIN_RECORD_LEN: usize = COMMAND_TAG_LEN + COMMAND_AUX_LEN + PLAYER_ID_OFFSET + 1;

/// Sub-block kinds of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Cycle header
    Rsyn,
    /// Synchronization payload
    Sync,
    /// Acknowledgment trailer
    Rtok,
}

impl Marker {
    /// All markers in stream order
    pub const ALL: [Marker; 3] = [Marker::Rsyn, Marker::Sync, Marker::Rtok];

    /// The 4 magic bytes opening this sub-block
    pub const fn magic(self) -> [u8; 4] {
        match self {
            Marker::Rsyn => *b"RSYN",
            Marker::Sync => *b"SYNC",
            Marker::Rtok => *b"RTOK",
        }
    }

    /// Length of the sub-block, magic included.
    ///
    /// SYNC has no fixed length; it is declared per cycle by the RSYN header.
    pub const fn fixed_len(self) -> Option<usize> {
        match self {
            Marker::Rsyn => Some(8),
            Marker::Sync => None,
            Marker::Rtok => Some(18),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Marker::Rsyn => "RSYN",
            Marker::Sync => "SYNC",
            Marker::Rtok => "RTOK",
        }
    }

    /// Check whether `bytes` opens with this marker's magic
    pub fn matches(self, bytes: &[u8]) -> bool {
        bytes.starts_with(&self.magic())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
