//! icreplay core - tick-cycle replay decoding
//!
//! This crate decodes the RSYN/SYNC/RTOK capture stream written by a
//! real-time strategy game's network-synchronization layer into per-tick
//! activity and per-player command tallies.
//!
//! # Architecture
//!
//! - [`replay::CycleScanner`] - Finds and validates cycles in a raw buffer
//! - [`replay::CommandExtractor`] - Slices SYNC bodies into command records
//! - [`replay::SessionSummary`] - Pure fold of cycles into session totals
//! - [`config`] - TOML configuration for decode and output defaults
//!
//! The crate performs no I/O on captures; callers load the bytes and hand
//! over a slice.

pub mod config;
pub mod replay;
#[cfg(test)]
pub mod test_utils;

// Re-export the decoding entry points
pub use replay::{
    CommandFilter, DecodeError, DecodeOptions, Decoded, Decoder, IndexingPolicy, SessionReport,
    SessionSummary, StructuralError, decode,
};
