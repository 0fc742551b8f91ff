//! Shared test utilities for unit tests
//!
//! Builders that synthesise RSYN/SYNC/RTOK captures in memory, so decoder
//! tests never need real capture files.

use crate::replay::binary::{COMMAND_COUNT_OFFSET, EMPTY_TICK_SENTINEL, Marker, SYNC_HEADER_LEN};

// ============================================================================
// Byte-level helpers
// ============================================================================

/// Build one command record of `width` bytes with the player id at trailing[2]
pub fn command(tag: &[u8; 4], player: u8, width: usize) -> Vec<u8> {
    assert!(width >= 11, "record must hold tag, auxiliary and player id");
    let mut bytes = Vec::with_capacity(width);
    bytes.extend_from_slice(tag);
    bytes.extend_from_slice(&[0xA0, 0xA1, 0xA2, 0xA3]);
    let trailing_start = bytes.len();
    bytes.resize(width, 0);
    bytes[trailing_start + 2] = player;
    bytes
}

/// Build a SYNC block holding `records` back-to-back
pub fn sync_block(records: &[Vec<u8>]) -> Vec<u8> {
    sync_block_with_count(records, records.len() as u8)
}

/// Build a SYNC block whose header declares `count` commands, whatever the body holds
pub fn sync_block_with_count(records: &[Vec<u8>], count: u8) -> Vec<u8> {
    let mut bytes = Marker::Sync.magic().to_vec();
    bytes.resize(SYNC_HEADER_LEN, 0);
    bytes[COMMAND_COUNT_OFFSET] = count;
    for record in records {
        bytes.extend_from_slice(record);
    }
    bytes[8] = bytes.len() as u8;
    bytes
}

/// Build an 18-byte RTOK trailer
pub fn trailer() -> Vec<u8> {
    let mut bytes = Marker::Rtok.magic().to_vec();
    bytes.resize(18, 0x5A);
    bytes
}

/// Build a whole cycle around `sync`, declaring its real length
pub fn cycle_bytes(sync: &[u8]) -> Vec<u8> {
    cycle_bytes_declaring(sync, sync.len() as u8)
}

/// Build a whole cycle around `sync`, declaring `declared` as its length
pub fn cycle_bytes_declaring(sync: &[u8], declared: u8) -> Vec<u8> {
    let mut bytes = Marker::Rsyn.magic().to_vec();
    bytes.extend_from_slice(&[declared, 0, 0, 0]);
    bytes.extend_from_slice(sync);
    bytes.extend_from_slice(&trailer());
    bytes
}

// ============================================================================
// Stream builder
// ============================================================================

/// Fluent builder for whole captures
#[derive(Debug, Default)]
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append arbitrary bytes (leading blob, gap, garbage)
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Append a tick without commands
    pub fn empty_cycle(self) -> Self {
        let sync = sync_block(&[]);
        debug_assert_eq!(sync.len(), EMPTY_TICK_SENTINEL as usize);
        self.raw(&cycle_bytes(&sync))
    }

    /// Append a tick whose records are `(tag, player)` pairs of equal `width`
    pub fn cycle(self, commands: &[(&[u8; 4], u8)], width: usize) -> Self {
        let records: Vec<Vec<u8>> = commands
            .iter()
            .map(|(tag, player)| command(tag, *player, width))
            .collect();
        self.raw(&cycle_bytes(&sync_block(&records)))
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
