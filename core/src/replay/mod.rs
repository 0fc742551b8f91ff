//! Tick-cycle replay decoder
//!
//! Reconstructs per-tick activity and per-player command tallies from a
//! raw RSYN/SYNC/RTOK capture held fully in memory.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────────┐    ┌────────────────┐
//! │ CycleScanner │ ─▶ │ CommandExtractor  │ ─▶ │ SessionSummary │
//! │ bytes→Cycle  │    │ SyncBlock→records │    │ fold → totals  │
//! └──────────────┘    └───────────────────┘    └────────────────┘
//! ```
//!
//! Nothing flows backwards. The scanner borrows the caller's buffer and
//! never copies it; the summary never sees a byte offset.
//!
//! # Usage
//!
//! ```ignore
//! use icreplay_core::replay::{DecodeOptions, decode};
//!
//! let bytes = std::fs::read("match.sgm")?;
//! let decoded = decode(&bytes, &DecodeOptions::default())?;
//!
//! println!("{} ticks, {} commands", decoded.summary.cycle_count, decoded.summary.command_count);
//! for (player, tally) in decoded.summary.sorted_players() {
//!     for (tag, count) in tally.sorted() {
//!         println!("player {player}: {tag} x{count}");
//!     }
//! }
//! ```
//!
//! Cycle-by-cycle consumption goes through [`Decoder::cycles`], which yields
//! lazily and stops at the first structural error.

pub mod binary;
pub mod decode;
pub mod error;
pub mod summary;
pub mod types;

// Re-export format pieces
pub use binary::{CommandExtractor, CommandList, CycleScanner, IndexingPolicy, Marker};

// Re-export decoding
pub use decode::{
    CommandFilter, DecodeError, DecodeOptions, Decoded, DecodedCycle, DecodedCycles, Decoder,
    decode,
};
pub use error::StructuralError;

// Re-export results
pub use summary::{
    DEFAULT_TICKS_PER_SECOND, PlayerReport, PlayerTally, SessionReport, SessionSummary, TagCount,
    format_game_time,
};
pub use types::{CommandRecord, CommandTag, Cycle, PlayerId, RawRegions, SyncBlock};
