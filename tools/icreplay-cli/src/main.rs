//! icreplay CLI - Inspect RSYN/SYNC/RTOK replay captures
//!
//! # Commands
//!
//! - `icreplay decode` - Walk a capture, optionally printing cycles and commands, then summarise
//! - `icreplay report` - Write the session summary as JSON
//!
//! # Usage
//!
//! ```bash
//! # Summary only
//! icreplay decode match.sgm
//!
//! # Every non-empty cycle, pausing after each one
//! icreplay decode match.sgm --print-cycles --stall
//!
//! # Every GCEE command, decoding records by position
//! icreplay decode match.sgm --print-commands GCEE --indexing positional
//!
//! # JSON summary for tooling
//! icreplay report match.sgm -o match.json
//! ```
//!
//! # Config (config.toml)
//!
//! ```toml
//! [decode]
//! indexing = "first-record"
//!
//! [output]
//! include_empty_cycles = false
//! command_filter = "none"
//! summary = true
//!
//! [session]
//! ticks_per_second = 12
//! ```

mod decode;
mod input;
mod print;
mod report;
mod settings;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// icreplay - Inspect RSYN/SYNC/RTOK replay captures
#[derive(Parser)]
#[command(name = "icreplay")]
#[command(about = "Decode tick-cycle replay captures")]
#[command(version)]
struct Cli {
    /// Config file (defaults to config.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a capture and print its summary
    Decode(decode::DecodeArgs),

    /// Write the session summary as JSON
    Report(report::ReportArgs),
}

/// Map `-v` occurrences to a default filter; `RUST_LOG` still wins
fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the decoded output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(default_log_level(cli.verbose))
                }),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = settings::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Decode(args) => decode::execute(args, &config),
        Commands::Report(args) => report::execute(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use icreplay_core::replay::{CommandFilter, CommandTag, IndexingPolicy};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(default_log_level(0), "warn");
        assert_eq!(default_log_level(2), "debug");
        assert_eq!(default_log_level(9), "trace");
    }

    #[test]
    fn test_parse_decode_flags() {
        let cli = Cli::try_parse_from([
            "icreplay",
            "-vv",
            "decode",
            "match.sgm",
            "--print-cycles",
            "--print-commands",
            "GCEE",
            "--indexing",
            "first-record",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Decode(args) => {
                assert_eq!(args.file, PathBuf::from("match.sgm"));
                assert!(args.print_cycles);
                assert_eq!(
                    args.print_commands,
                    Some(CommandFilter::Tag(CommandTag(*b"GCEE")))
                );
                assert_eq!(args.indexing, Some(IndexingPolicy::FirstRecord));
            }
            Commands::Report(_) => panic!("expected decode"),
        }
    }

    #[test]
    fn test_last_empty_tick_flag_wins() {
        let cli = Cli::try_parse_from([
            "icreplay",
            "decode",
            "match.sgm",
            "--include-empty",
            "--no-include-empty",
        ])
        .unwrap();
        match cli.command {
            Commands::Decode(args) => {
                assert!(!args.include_empty);
                assert!(args.no_include_empty);
            }
            Commands::Report(_) => panic!("expected decode"),
        }
    }

    #[test]
    fn test_parse_report_output() {
        let cli =
            Cli::try_parse_from(["icreplay", "report", "match.sgm", "-o", "out.json"]).unwrap();
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
            }
            Commands::Decode(_) => panic!("expected report"),
        }
    }
}
