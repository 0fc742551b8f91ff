//! Decode command - walk a capture and print what it contains

use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use icreplay_core::config::Config;
use icreplay_core::replay::{CommandFilter, DecodeOptions, Decoder, IndexingPolicy, SessionSummary};

use crate::input;
use crate::print;

/// Arguments for the decode command
#[derive(Args)]
pub struct DecodeArgs {
    /// Capture file to decode
    pub file: PathBuf,

    /// Dump every cycle (header, SYNC block, commands, trailer)
    #[arg(long)]
    pub print_cycles: bool,

    /// Print commands with this tag, or "all"
    #[arg(long, value_name = "TAG")]
    pub print_commands: Option<CommandFilter>,

    /// Also print empty ticks
    #[arg(long, overrides_with = "no_include_empty")]
    pub include_empty: bool,

    /// Skip empty ticks even if the config includes them
    #[arg(long)]
    pub no_include_empty: bool,

    /// Wait for Enter after each printed cycle
    #[arg(long)]
    pub stall: bool,

    /// Skip the session summary
    #[arg(long)]
    pub no_summary: bool,

    /// Record indexing policy (positional or first-record)
    #[arg(long)]
    pub indexing: Option<IndexingPolicy>,
}

/// Effective settings after applying flags over the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    print_cycles: bool,
    commands: CommandFilter,
    include_empty: bool,
    stall: bool,
    summary: bool,
    indexing: IndexingPolicy,
    ticks_per_second: u32,
}

impl Settings {
    fn resolve(args: &DecodeArgs, config: &Config) -> Self {
        Self {
            print_cycles: args.print_cycles,
            commands: args.print_commands.unwrap_or(config.output.command_filter),
            include_empty: match (args.include_empty, args.no_include_empty) {
                (true, _) => true,
                (false, true) => false,
                (false, false) => config.output.include_empty_cycles,
            },
            stall: args.stall,
            summary: config.output.summary && !args.no_summary,
            indexing: args.indexing.unwrap_or(config.decode.indexing),
            ticks_per_second: config.session.ticks_per_second,
        }
    }

    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            include_empty_cycles: self.include_empty,
            command_filter: self.commands,
            indexing: self.indexing,
        }
    }
}

/// Execute the decode command
pub fn execute(args: DecodeArgs, config: &Config) -> Result<()> {
    let settings = Settings::resolve(&args, config);
    let bytes = input::load_capture(&args.file)
        .with_context(|| format!("Failed to load capture: {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut stdin = io::stdin().lock();

    run(&bytes, &settings, &mut out, &mut stdin)
        .with_context(|| format!("Failed to decode {}", input::display_name(&args.file)))
}

/// Decode `bytes`, writing cycles, commands and the summary to `out`
///
/// When stalling, one line is read from `pause` after each printed cycle.
fn run(
    bytes: &[u8],
    settings: &Settings,
    out: &mut impl Write,
    pause: &mut impl BufRead,
) -> Result<()> {
    let options = settings.decode_options();
    let decoder = Decoder::new(options);

    let mut summary = SessionSummary::new();
    for decoded in decoder.cycles(bytes) {
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(err) => {
                if settings.summary {
                    writeln!(out, "Decode stopped early; summary is incomplete")?;
                    print::write_summary(out, &summary, settings.ticks_per_second)?;
                }
                return Err(err.into());
            }
        };

        summary = summary.update(&decoded.cycle, &decoded.commands);

        if !options.retains(&decoded.cycle) {
            continue;
        }
        let mut printed = settings.print_cycles;
        if settings.print_cycles {
            print::write_cycle(out, &decoded)?;
        }
        for cmd in decoded.retained_commands(&options.command_filter) {
            print::write_command(out, decoded.cycle.index, cmd)?;
            printed = true;
        }

        if settings.stall && printed {
            out.flush()?;
            let mut line = String::new();
            if pause.read_line(&mut line)? == 0 {
                tracing::debug!("stdin closed, no longer stalling");
            }
        }
    }

    if settings.summary {
        print::write_summary(out, &summary, settings.ticks_per_second)?;
    }
    Ok(())
}
