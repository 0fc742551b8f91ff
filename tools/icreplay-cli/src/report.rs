//! Report command - write the session summary as JSON

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use icreplay_core::config::Config;
use icreplay_core::replay::{CommandFilter, DecodeError, DecodeOptions, Decoder, SessionReport};

use crate::input;

/// Arguments for the report command
#[derive(Args)]
pub struct ReportArgs {
    /// Capture file to decode
    pub file: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the report command
///
/// A capture that fails to decode still produces a report, marked
/// incomplete, before the error is returned.
pub fn execute(args: ReportArgs, config: &Config) -> Result<()> {
    let bytes = input::load_capture(&args.file)
        .with_context(|| format!("Failed to load capture: {}", args.file.display()))?;

    let (report, failure) = build_report(&bytes, &input::display_name(&args.file), config);

    let json = report.to_json().context("Failed to serialize report")?;
    write_report(&json, args.output.as_deref())?;

    match failure {
        Some(err) => Err(err).with_context(|| format!("Failed to decode {}", args.file.display())),
        None => Ok(()),
    }
}

/// Decode summary only; cycle detail is never retained for reports
fn build_report(
    bytes: &[u8],
    input: &str,
    config: &Config,
) -> (SessionReport, Option<DecodeError>) {
    let options = DecodeOptions {
        include_empty_cycles: false,
        command_filter: CommandFilter::None,
        indexing: config.decode.indexing,
    };
    let tps = config.session.ticks_per_second;

    match Decoder::new(options).decode(bytes) {
        Ok(decoded) => (SessionReport::new(&decoded.summary, tps).with_input(input), None),
        Err(err) => {
            let report = SessionReport::new(&err.partial, tps)
                .with_input(input)
                .with_error(&err.source);
            (report, Some(err))
        }
    }
}

fn write_report(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            tracing::info!("report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
