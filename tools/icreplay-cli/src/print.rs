//! Human-readable rendering of decoded cycles and summaries

use std::io::{self, Write};

use icreplay_core::replay::{CommandRecord, DecodedCycle, SessionSummary, format_game_time};

/// Full dump of one cycle: the three regions, the SYNC header and each command
pub fn write_cycle(out: &mut impl Write, decoded: &DecodedCycle<'_>) -> io::Result<()> {
    let cycle = &decoded.cycle;
    let sync = &cycle.sync_block;

    writeln!(
        out,
        "RSYN (T{:06}): len({}) {:?}",
        cycle.index,
        cycle.header.len(),
        cycle.header
    )?;
    writeln!(
        out,
        "SYNC (T{:06}): len({}) {:?}",
        cycle.index,
        sync.total_length(),
        sync.bytes()
    )?;
    writeln!(
        out,
        "SYNC header   : {:?} (total sync len: {}; cmd in sync body: {}, cmd len: {})",
        sync.header(),
        sync.total_length(),
        sync.command_count(),
        decoded.record_width()
    )?;
    for cmd in &decoded.commands {
        writeln!(
            out,
            "CMD{:02}    {} : {:?}",
            cmd.index + 1,
            cmd.tag(),
            &cmd.bytes()[4..]
        )?;
    }
    writeln!(
        out,
        "RTOK (T{:06}): len({}) {:?}",
        cycle.index,
        cycle.trailer.len(),
        cycle.trailer
    )
}

/// One line per command: tick, tag, auxiliary bytes (escaped) and trailing bytes
pub fn write_command(out: &mut impl Write, tick: u64, cmd: &CommandRecord<'_>) -> io::Result<()> {
    writeln!(
        out,
        "T{:08}: {} : \"{}\" : {:?}",
        tick,
        cmd.tag(),
        cmd.auxiliary().escape_ascii(),
        cmd.trailing()
    )
}

/// Session totals followed by each player's tallies, ordered by id then tag
pub fn write_summary(
    out: &mut impl Write,
    summary: &SessionSummary,
    ticks_per_second: u32,
) -> io::Result<()> {
    let time = format_game_time(summary.game_time(ticks_per_second));

    writeln!(
        out,
        "Game duration: {} ticks / {} time ({} ticks/s)",
        summary.cycle_count, time, ticks_per_second
    )?;
    writeln!(out, "Total GC issued : {}", summary.command_count)?;
    writeln!(out, "First action : {} ticks", summary.first_action_tick)?;

    writeln!(out, "Player summary:")?;
    for (player, tally) in summary.sorted_players() {
        writeln!(out, "Player ID {}:", player)?;
        for (tag, count) in tally.sorted() {
            writeln!(out, "{}: {}", tag, count)?;
        }
    }
    Ok(())
}
