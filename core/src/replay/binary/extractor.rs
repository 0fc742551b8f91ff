//! Command extractor
//!
//! Splits a SYNC body into its fixed-width command records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{COMMAND_PREFIX, MIN_RECORD_LEN};
use crate::replay::error::StructuralError;
use crate::replay::types::{CommandRecord, SyncBlock};

/// Which slice of the body each record index reads
///
/// Captures decoded so far have only been checked against the first-record
/// reading, where every iteration re-reads `body[0..width]`. Positional
/// reading takes record `c` from `body[width * c..width * (c + 1)]`. Both are
/// kept selectable until a capture with known ground truth settles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexingPolicy {
    /// Decode each record from its own position
    #[default]
    Positional,
    /// Decode the first record `command_count` times
    #[serde(alias = "first")]
    FirstRecord,
}

impl IndexingPolicy {
    /// Byte range of record `index` for records of `width` bytes
    fn range(self, index: usize, width: usize) -> std::ops::Range<usize> {
        let slot = match self {
            IndexingPolicy::Positional => index,
            IndexingPolicy::FirstRecord => 0,
        };
        width * slot..width * (slot + 1)
    }

    pub const fn name(self) -> &'static str {
        match self {
            IndexingPolicy::Positional => "positional",
            IndexingPolicy::FirstRecord => "first-record",
        }
    }
}

impl fmt::Display for IndexingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unknown indexing policy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown indexing policy {0:?} (expected \"positional\" or \"first-record\")")]
pub struct ParsePolicyError(pub String);

impl FromStr for IndexingPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positional" => Ok(IndexingPolicy::Positional),
            "first-record" | "first" => Ok(IndexingPolicy::FirstRecord),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Records of one cycle; most ticks carry only a handful
pub type CommandList<'a> = SmallVec<[CommandRecord<'a>; 4]>;

/// Slices SYNC bodies into [`CommandRecord`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandExtractor {
    policy: IndexingPolicy,
}

impl CommandExtractor {
    pub fn new(policy: IndexingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> IndexingPolicy {
        self.policy
    }

    /// Extract `command_count` records from `block`
    ///
    /// # Errors
    ///
    /// - [`StructuralError::UnevenRecords`] if the body length is not a
    ///   multiple of the command count
    /// - [`StructuralError::RecordTooShort`] if records cannot hold a player id
    /// - [`StructuralError::CommandPrefix`] if a record does not start with `GC`
    pub fn extract<'a>(&self, block: &SyncBlock<'a>) -> Result<CommandList<'a>, StructuralError> {
        let count = block.command_count();
        if count == 0 {
            return Ok(CommandList::new());
        }

        let body = block.body();
        if body.len() % count != 0 {
            return Err(StructuralError::UnevenRecords {
                offset: block.offset(),
                body_len: body.len(),
                command_count: count,
                sync: block.bytes().to_vec(),
            });
        }

        let width = body.len() / count;
        if width < MIN_RECORD_LEN {
            return Err(StructuralError::RecordTooShort {
                offset: block.offset(),
                width,
                minimum: MIN_RECORD_LEN,
                body_len: body.len(),
                command_count: count,
                sync: block.bytes().to_vec(),
            });
        }

        let mut records = CommandList::with_capacity(count);
        for index in 0..count {
            let range = self.policy.range(index, width);
            let offset = block.body_offset() + range.start;
            let bytes = &body[range];

            if !bytes.starts_with(&COMMAND_PREFIX) {
                return Err(StructuralError::CommandPrefix {
                    index,
                    offset,
                    record: bytes.to_vec(),
                });
            }

            let record = CommandRecord::new(index, offset, bytes);
            tracing::trace!(
                index,
                offset,
                tag = %record.tag(),
                player = %record.player_id(),
                "command"
            );
            records.push(record);
        }

        Ok(records)
    }
}
