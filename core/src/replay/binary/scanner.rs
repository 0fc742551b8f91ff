//! Cycle scanner
//!
//! Walks a capture left to right, finds each RSYN marker and slices the
//! cycle into its three regions. The scan offset only ever moves forward.

use std::iter::FusedIterator;

use super::{EMPTY_TICK_SENTINEL, Marker, SYNC_HEADER_LEN, SYNC_LENGTH_OFFSET};
use crate::replay::error::StructuralError;
use crate::replay::types::{Cycle, RawRegions, SyncBlock};

const HEADER_LEN: usize = match Marker::Rsyn.fixed_len() {
    Some(len) => len,
    None => unreachable!(),
};

const TRAILER_LEN: usize = match Marker::Rtok.fixed_len() {
    Some(len) => len,
    None => unreachable!(),
};

/// Lazy, forward-only producer of [`Cycle`]s over a borrowed buffer
///
/// Yields `Ok` for each well-formed cycle in stream order and stops with
/// `None` once no further RSYN marker exists. A structural problem is
/// yielded once as `Err`, after which the scanner is finished.
///
/// ```ignore
/// for cycle in CycleScanner::new(&capture) {
///     let cycle = cycle?;
///     println!("T{}: {} bytes of SYNC", cycle.index, cycle.sync_block.total_length());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CycleScanner<'a> {
    buffer: &'a [u8],
    offset: usize,
    cycles_found: u64,
    finished: bool,
}

impl<'a> CycleScanner<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            cycles_found: 0,
            finished: false,
        }
    }

    /// Current scan offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of well-formed cycles yielded so far
    pub fn cycles_found(&self) -> u64 {
        self.cycles_found
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Locate the next RSYN marker at or after `from`
    fn find_marker(&self, from: usize) -> Option<usize> {
        let magic = Marker::Rsyn.magic();
        self.buffer
            .get(from..)?
            .windows(magic.len())
            .position(|window| window == magic)
            .map(|pos| from + pos)
    }

    /// Copy whatever exists of the three regions, clipped to the buffer
    fn raw_regions(&self, start: usize, declared: usize) -> RawRegions {
        let clip = |from: usize, len: usize| {
            let from = from.min(self.buffer.len());
            let to = from.saturating_add(len).min(self.buffer.len());
            self.buffer[from..to].to_vec()
        };
        let sync_start = start + HEADER_LEN;
        RawRegions {
            header: clip(start, HEADER_LEN),
            sync: clip(sync_start, declared),
            trailer: clip(sync_start + declared, TRAILER_LEN),
        }
    }

    /// Slice and validate the cycle whose RSYN marker sits at `start`
    fn read_cycle(&self, start: usize, index: u64) -> Result<Cycle<'a>, StructuralError> {
        let buffer = self.buffer;

        let available = buffer.len() - start;
        if available < HEADER_LEN {
            return Err(StructuralError::Truncated {
                cycle: index,
                offset: start,
                region: Marker::Rsyn,
                expected: HEADER_LEN,
                available,
                regions: self.raw_regions(start, 0),
            });
        }

        let declared = buffer[start + SYNC_LENGTH_OFFSET] as usize;
        let sync_start = start + HEADER_LEN;
        let trailer_start = sync_start + declared;
        let end = trailer_start + TRAILER_LEN;

        if trailer_start > buffer.len() {
            return Err(StructuralError::Truncated {
                cycle: index,
                offset: start,
                region: Marker::Sync,
                expected: declared,
                available: buffer.len() - sync_start,
                regions: self.raw_regions(start, declared),
            });
        }
        if end > buffer.len() {
            return Err(StructuralError::Truncated {
                cycle: index,
                offset: start,
                region: Marker::Rtok,
                expected: TRAILER_LEN,
                available: buffer.len() - trailer_start,
                regions: self.raw_regions(start, declared),
            });
        }

        let header = &buffer[start..sync_start];
        let sync = &buffer[sync_start..trailer_start];
        let trailer = &buffer[trailer_start..end];

        // All three tags are checked before anything inside them is trusted
        let mismatch = [(Marker::Rsyn, header), (Marker::Sync, sync), (Marker::Rtok, trailer)]
            .into_iter()
            .find(|(marker, region)| !marker.matches(region));
        if let Some((region, _)) = mismatch {
            return Err(StructuralError::MarkerMismatch {
                cycle: index,
                offset: start,
                region,
                regions: self.raw_regions(start, declared),
            });
        }

        if declared < SYNC_HEADER_LEN {
            return Err(StructuralError::SyncTooShort {
                cycle: index,
                offset: start,
                declared,
                minimum: SYNC_HEADER_LEN,
                regions: self.raw_regions(start, declared),
            });
        }

        Ok(Cycle {
            index,
            offset: start,
            is_empty: header[SYNC_LENGTH_OFFSET] == EMPTY_TICK_SENTINEL,
            header,
            sync_block: SyncBlock::new(sync_start, sync),
            trailer,
        })
    }
}

impl<'a> Iterator for CycleScanner<'a> {
    type Item = Result<Cycle<'a>, StructuralError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(start) = self.find_marker(self.offset) else {
            tracing::trace!(
                offset = self.offset,
                remaining = self.buffer.len().saturating_sub(self.offset),
                "no further RSYN marker"
            );
            self.offset = self.buffer.len();
            self.finished = true;
            return None;
        };

        if start > self.offset {
            tracing::trace!(
                offset = self.offset,
                skipped = start - self.offset,
                "skipped bytes before RSYN"
            );
        }

        let index = self.cycles_found + 1;
        match self.read_cycle(start, index) {
            Ok(cycle) => {
                tracing::debug!(
                    cycle = cycle.index,
                    offset = cycle.offset,
                    sync_len = cycle.sync_block.total_length(),
                    empty = cycle.is_empty,
                    "cycle"
                );
                self.offset = cycle.end_offset();
                self.cycles_found = index;
                Some(Ok(cycle))
            }
            Err(err) => {
                tracing::warn!(cycle = index, offset = start, "scan aborted: {}", err);
                self.offset = start;
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for CycleScanner<'_> {}
