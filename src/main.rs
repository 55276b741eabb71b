//! ASC to pcapng converter.
//!
//! Usage:
//!   asc2pcapng trace.asc trace.pcapng
//!
//! `RUST_LOG` controls log output on stderr (default `info`, `-v` for
//! `debug`).

use std::path::PathBuf;
use std::process::ExitCode;

use asc2pcapng::{AscReader, Converter, PcapngWriter};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "asc2pcapng",
    version,
    about = "Convert a Vector ASC trace into a pcapng capture"
)]
struct Args {
    /// ASC trace to read
    infile: PathBuf,

    /// pcapng capture to write
    outfile: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // help and version go to stdout and succeed; usage errors fail
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Ok(reader) = AscReader::open(&args.infile) else {
        eprintln!("Unable to open: {}", args.infile.display());
        return ExitCode::FAILURE;
    };
    let Ok(mut writer) = PcapngWriter::create(&args.outfile) else {
        eprintln!("Unable to open: {}", args.outfile.display());
        return ExitCode::FAILURE;
    };

    let mut converter = Converter::new();
    let stats = match converter.run(reader, &mut writer) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Conversion failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = writer.finish() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    info!(
        events = stats.events_read,
        packets = stats.packets_written,
        can = stats.can_frames,
        ethernet = stats.ethernet_frames,
        errors = stats.error_frames,
        skipped = stats.skipped,
        "converted {} to {}",
        args.infile.display(),
        args.outfile.display()
    );
    if let Some(line) = stats.fault_line {
        info!("conversion stopped early at line {line}");
    }
    ExitCode::SUCCESS
}
