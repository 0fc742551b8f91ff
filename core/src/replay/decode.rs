//! Decode driver
//!
//! Wires the scanner, the extractor and the summary fold together. Data
//! flows one way: cycles are scanned, their commands extracted, and both
//! folded into a [`SessionSummary`].

use std::fmt;
use std::str::FromStr;

use super::binary::{CommandExtractor, CommandList, CycleScanner, IndexingPolicy};
use super::error::StructuralError;
use super::summary::SessionSummary;
use super::types::{CommandRecord, CommandTag, Cycle, ParseTagError};

/// Which command records are kept for detailed reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandFilter {
    /// Keep no command detail
    None,
    /// Keep every command
    #[default]
    All,
    /// Keep commands with this tag only
    Tag(CommandTag),
}

impl CommandFilter {
    pub fn matches(&self, tag: &CommandTag) -> bool {
        match self {
            CommandFilter::None => false,
            CommandFilter::All => true,
            CommandFilter::Tag(wanted) => wanted == tag,
        }
    }
}

impl fmt::Display for CommandFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandFilter::None => f.write_str("none"),
            CommandFilter::All => f.write_str("all"),
            CommandFilter::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for CommandFilter {
    type Err = ParseTagError;

    /// `""` or `"none"`, `"all"`, or a 4-byte tag such as `"GCEE"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(CommandFilter::None),
            "all" => Ok(CommandFilter::All),
            tag => tag.parse().map(CommandFilter::Tag),
        }
    }
}

impl serde::Serialize for CommandFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for CommandFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Presentation and indexing choices for a decode
///
/// `include_empty_cycles` and `command_filter` only affect what is retained
/// in [`Decoded::cycles`]; the summary counts are identical for any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Keep empty ticks in the retained cycle list
    pub include_empty_cycles: bool,
    /// Restrict retained command detail
    pub command_filter: CommandFilter,
    /// How record indices map onto the SYNC body
    pub indexing: IndexingPolicy,
}

impl DecodeOptions {
    /// Whether `cycle` is kept for detailed reporting
    pub fn retains(&self, cycle: &Cycle<'_>) -> bool {
        self.include_empty_cycles || !cycle.is_empty
    }
}

/// A cycle together with every command extracted from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCycle<'a> {
    pub cycle: Cycle<'a>,
    pub commands: CommandList<'a>,
}

impl<'a> DecodedCycle<'a> {
    /// Commands passing `filter`
    pub fn retained_commands<'f>(
        &'f self,
        filter: &'f CommandFilter,
    ) -> impl Iterator<Item = &'f CommandRecord<'a>> + 'f {
        self.commands
            .iter()
            .filter(move |cmd| filter.matches(&cmd.tag()))
    }

    /// Record width of this cycle's SYNC body, 0 when it has no commands
    pub fn record_width(&self) -> usize {
        self.cycle.sync_block.record_width().unwrap_or(0)
    }
}

/// Lazy sequence of [`DecodedCycle`]s
///
/// Stops after the first structural error, like the scanner underneath.
#[derive(Debug, Clone)]
pub struct DecodedCycles<'a> {
    scanner: CycleScanner<'a>,
    extractor: CommandExtractor,
    failed: bool,
}

impl<'a> DecodedCycles<'a> {
    /// Byte offset the scanner has reached
    pub fn offset(&self) -> usize {
        self.scanner.offset()
    }
}

impl<'a> Iterator for DecodedCycles<'a> {
    type Item = Result<DecodedCycle<'a>, StructuralError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.scanner.next()?.and_then(|cycle| {
            let commands = self.extractor.extract(&cycle.sync_block)?;
            Ok(DecodedCycle { cycle, commands })
        });
        if let Err(err) = &result {
            tracing::warn!(offset = err.offset(), "decode aborted: {}", err);
            self.failed = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for DecodedCycles<'_> {}

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<'a> {
    pub summary: SessionSummary,
    /// Cycles retained under the decode options, commands already filtered
    pub cycles: Vec<DecodedCycle<'a>>,
}

/// A decode cut short by a structural error
///
/// `partial` holds every cycle folded before the failure. It is not
/// authoritative and must be treated as incomplete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decode aborted after {} cycles", .partial.cycle_count)]
pub struct DecodeError {
    #[source]
    pub source: StructuralError,
    pub partial: SessionSummary,
}

/// Decodes whole captures
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Lazily decode `buffer` cycle by cycle, without filtering
    pub fn cycles<'a>(&self, buffer: &'a [u8]) -> DecodedCycles<'a> {
        DecodedCycles {
            scanner: CycleScanner::new(buffer),
            extractor: CommandExtractor::new(self.options.indexing),
            failed: false,
        }
    }

    /// Decode `buffer` completely
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on the first structural problem, carrying the
    /// summary of the cycles folded so far.
    pub fn decode<'a>(&self, buffer: &'a [u8]) -> Result<Decoded<'a>, DecodeError> {
        let mut summary = SessionSummary::new();
        let mut retained = Vec::new();

        for decoded in self.cycles(buffer) {
            let decoded = match decoded {
                Ok(decoded) => decoded,
                Err(source) => {
                    return Err(DecodeError {
                        source,
                        partial: summary,
                    });
                }
            };

            summary = summary.update(&decoded.cycle, &decoded.commands);

            if !self.options.retains(&decoded.cycle) {
                continue;
            }
            let commands: CommandList<'a> = decoded
                .retained_commands(&self.options.command_filter)
                .copied()
                .collect();
            retained.push(DecodedCycle {
                cycle: decoded.cycle,
                commands,
            });
        }

        tracing::info!(
            cycles = summary.cycle_count,
            commands = summary.command_count,
            players = summary.player_count(),
            first_action = summary.first_action_tick,
            "decode complete"
        );

        Ok(Decoded {
            summary,
            cycles: retained,
        })
    }
}

/// Decode `buffer` with `options`
pub fn decode<'a>(buffer: &'a [u8], options: &DecodeOptions) -> Result<Decoded<'a>, DecodeError> {
    Decoder::new(*options).decode(buffer)
}
