//! Session aggregation
//!
//! [`SessionSummary`] is the fold state of a decode. It knows nothing about
//! byte layout: it consumes cycle indices, empty flags, player ids and
//! command tags, so the counting logic can be exercised without a capture.

use std::time::Duration;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::types::{CommandRecord, CommandTag, Cycle, PlayerId};

/// Cycles per second of game time at "Fast" speed
pub const DEFAULT_TICKS_PER_SECOND: u32 = 12;

/// Command counts for one player, keyed by tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerTally {
    counts: HashMap<CommandTag, u64>,
}

impl PlayerTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `tag`
    pub fn record(&mut self, tag: CommandTag) {
        *self.counts.entry(tag).or_insert(0) += 1;
    }

    /// Occurrences of `tag` (0 if never seen)
    pub fn count(&self, tag: &CommandTag) -> u64 {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    /// Commands issued by this player across all tags
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct tags
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&CommandTag, &u64)> {
        self.counts.iter()
    }

    /// Entries ordered by tag, for stable presentation
    pub fn sorted(&self) -> Vec<(CommandTag, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(t, c)| (*t, *c)).collect();
        entries.sort_unstable_by_key(|(tag, _)| *tag);
        entries
    }
}

/// Running totals of a decode
///
/// Every update consumes the summary and returns the next one, so a decode
/// is a plain fold with no shared mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Cycles seen, empty ones included
    pub cycle_count: u64,
    /// Commands declared across all cycles
    pub command_count: u64,
    /// Index of the first non-empty cycle (0 if none)
    pub first_action_tick: u64,
    players: HashMap<PlayerId, PlayerTally>,
}

impl SessionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded cycle and its commands
    pub fn update(self, cycle: &Cycle<'_>, commands: &[CommandRecord<'_>]) -> Self {
        commands
            .iter()
            .fold(self.record_cycle(cycle.index, cycle.is_empty), |summary, cmd| {
                summary.record_command(cmd.player_id(), cmd.tag())
            })
    }

    /// Count a cycle; the first non-empty one sets the first-action tick
    pub fn record_cycle(mut self, index: u64, is_empty: bool) -> Self {
        self.cycle_count += 1;
        if !is_empty && self.first_action_tick == 0 {
            self.first_action_tick = index;
        }
        self
    }

    /// Count a command for `player`, creating its tally on first sight
    pub fn record_command(mut self, player: PlayerId, tag: CommandTag) -> Self {
        self.command_count += 1;
        self.players.entry(player).or_default().record(tag);
        self
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerTally> {
        self.players.get(&id)
    }

    /// Number of distinct players seen
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Tallies in arbitrary order
    pub fn players(&self) -> impl Iterator<Item = (&PlayerId, &PlayerTally)> {
        self.players.iter()
    }

    /// Tallies ordered by player id
    pub fn sorted_players(&self) -> Vec<(PlayerId, &PlayerTally)> {
        let mut players: Vec<_> = self.players.iter().map(|(id, t)| (*id, t)).collect();
        players.sort_unstable_by_key(|(id, _)| *id);
        players
    }

    /// Whole seconds of game time covered by the decoded cycles
    ///
    /// Returns zero when `ticks_per_second` is zero.
    pub fn game_time(&self, ticks_per_second: u32) -> Duration {
        match self.cycle_count.checked_div(u64::from(ticks_per_second)) {
            Some(seconds) => Duration::from_secs(seconds),
            None => Duration::ZERO,
        }
    }
}

/// Render a duration as `m:ss`
pub fn format_game_time(duration: Duration) -> String {
    let seconds = duration.as_secs();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Serialisable snapshot of a [`SessionSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report format version
    #[serde(default = "default_version")]
    pub version: String,
    /// Capture file name (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// False when a structural error cut the decode short
    pub complete: bool,
    /// Total cycles (ticks)
    pub ticks: u64,
    /// Ticks per second used for `duration`
    pub ticks_per_second: u32,
    /// Game time as `m:ss`
    pub duration: String,
    /// Total commands issued
    pub commands: u64,
    /// Index of the first non-empty cycle (0 if none)
    pub first_action_tick: u64,
    /// Per-player tallies, ordered by player id
    pub players: Vec<PlayerReport>,
    /// Description of the error that ended the decode, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One player's command counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub player: PlayerId,
    pub total: u64,
    /// Counts ordered by tag
    pub commands: Vec<TagCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: CommandTag,
    pub count: u64,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl SessionReport {
    /// Snapshot a summary; `complete` is true unless the decode failed
    pub fn new(summary: &SessionSummary, ticks_per_second: u32) -> Self {
        let players = summary
            .sorted_players()
            .into_iter()
            .map(|(player, tally)| PlayerReport {
                player,
                total: tally.total(),
                commands: tally
                    .sorted()
                    .into_iter()
                    .map(|(tag, count)| TagCount { tag, count })
                    .collect(),
            })
            .collect();

        Self {
            version: default_version(),
            input: None,
            complete: true,
            ticks: summary.cycle_count,
            ticks_per_second,
            duration: format_game_time(summary.game_time(ticks_per_second)),
            commands: summary.command_count,
            first_action_tick: summary.first_action_tick,
            players,
            error: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Mark the report as cut short by `error`
    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.complete = false;
        self.error = Some(error.to_string());
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CommandTag = CommandTag(*b"GCEE");
    const B: CommandTag = CommandTag(*b"GCEN");

    // =============================================================
    // Tally tests
    // =============================================================

    #[test]
    fn test_tally_counts() {
        let mut tally = PlayerTally::new();
        tally.record(A);
        tally.record(B);
        tally.record(A);

        assert_eq!(tally.count(&A), 2);
        assert_eq!(tally.count(&B), 1);
        assert_eq!(tally.count(&CommandTag(*b"GCEP")), 0);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.sorted(), vec![(A, 2), (B, 1)]);
    }

    // =============================================================
    // Fold tests
    // =============================================================

    #[test]
    fn test_three_commands_two_players() {
        let summary = SessionSummary::new()
            .record_cycle(1, false)
            .record_command(PlayerId(1), A)
            .record_command(PlayerId(1), B)
            .record_command(PlayerId(2), A);

        assert_eq!(summary.command_count, 3);
        assert_eq!(summary.player_count(), 2);

        let p1 = summary.player(PlayerId(1)).unwrap();
        assert_eq!(p1.count(&A), 1);
        assert_eq!(p1.count(&B), 1);
        assert_eq!(p1.len(), 2);

        let p2 = summary.player(PlayerId(2)).unwrap();
        assert_eq!(p2.count(&A), 1);
        assert_eq!(p2.len(), 1);
    }

    #[test]
    fn test_first_action_tick() {
        let summary = [true, true, false, true]
            .into_iter()
            .zip(1..)
            .fold(SessionSummary::new(), |s, (empty, index)| {
                s.record_cycle(index, empty)
            });

        assert_eq!(summary.cycle_count, 4);
        assert_eq!(summary.first_action_tick, 3);
    }

    #[test]
    fn test_first_action_stays_zero_when_all_empty() {
        let summary = (1..=5).fold(SessionSummary::new(), |s, i| s.record_cycle(i, true));
        assert_eq!(summary.first_action_tick, 0);
        assert_eq!(summary.player_count(), 0);
    }

    #[test]
    fn test_first_action_not_overwritten() {
        let summary = SessionSummary::new()
            .record_cycle(1, false)
            .record_cycle(2, false);
        assert_eq!(summary.first_action_tick, 1);
    }

    #[test]
    fn test_sorted_players() {
        let summary = SessionSummary::new()
            .record_command(PlayerId(9), A)
            .record_command(PlayerId(3), A)
            .record_command(PlayerId(5), B);
        let ids: Vec<PlayerId> = summary.sorted_players().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![PlayerId(3), PlayerId(5), PlayerId(9)]);
    }

    // =============================================================
    // Game time tests
    // =============================================================

    #[test]
    fn test_game_time() {
        let summary = (1..=1500).fold(SessionSummary::new(), |s, i| s.record_cycle(i, true));
        let time = summary.game_time(DEFAULT_TICKS_PER_SECOND);
        assert_eq!(time, Duration::from_secs(125));
        assert_eq!(format_game_time(time), "2:05");
    }

    #[test]
    fn test_game_time_zero_rate() {
        let summary = SessionSummary::new().record_cycle(1, true);
        assert_eq!(summary.game_time(0), Duration::ZERO);
    }

    #[test]
    fn test_format_game_time() {
        assert_eq!(format_game_time(Duration::ZERO), "0:00");
        assert_eq!(format_game_time(Duration::from_secs(59)), "0:59");
        assert_eq!(format_game_time(Duration::from_secs(3600)), "60:00");
    }

    // =============================================================
    // Report tests
    // =============================================================

    #[test]
    fn test_report_is_ordered() {
        let summary = SessionSummary::new()
            .record_cycle(1, false)
            .record_command(PlayerId(2), B)
            .record_command(PlayerId(2), A)
            .record_command(PlayerId(1), A);

        let report = SessionReport::new(&summary, 12);
        assert!(report.complete);
        assert_eq!(report.players.len(), 2);
        assert_eq!(report.players[0].player, PlayerId(1));
        assert_eq!(report.players[1].total, 2);
        assert_eq!(report.players[1].commands[0].tag, A);
        assert_eq!(report.players[1].commands[1].tag, B);
    }

    #[test]
    fn test_report_json() {
        let summary = SessionSummary::new()
            .record_cycle(1, false)
            .record_command(PlayerId(4), A);
        let report = SessionReport::new(&summary, 12)
            .with_input("match.sgm")
            .with_error("boom");

        let json = report.to_json().unwrap();
        assert!(json.contains("\"input\": \"match.sgm\""));
        assert!(json.contains("\"complete\": false"));
        assert!(json.contains("\"tag\": \"GCEE\""));
        assert!(json.contains("\"player\": 4"));

        let parsed: SessionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_report_omits_absent_fields() {
        let report = SessionReport::new(&SessionSummary::new(), 12);
        let json = report.to_json().unwrap();
        assert!(!json.contains("\"input\""));
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"duration\": \"0:00\""));
    }
}
