//! Stream prefetcher simulator CLI.
//!
//! This binary provides a single entry point for all simulation modes. It performs:
//! 1. **Trace run:** Replay a JSON miss trace through the prefetcher harness.
//! 2. **Synthetic run:** Generate a single strided stream and replay it.
//!
//! Both modes accept an optional JSON configuration and print either the
//! text statistics report or the full statistics as JSON.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pfsim_core::config::Config;
use pfsim_core::sim::{Simulator, Trace, loader};
use pfsim_core::stats::{STATS_SECTIONS, SimStats};

#[derive(Parser, Debug)]
#[command(
    name = "pfsim",
    author,
    version,
    about = "Cycle-stepped stream prefetcher simulator",
    long_about = "Replay a miss trace through a stream prefetcher, DMA channel and blocking cache model.\n\nLogging is controlled with RUST_LOG (e.g. RUST_LOG=pfsim_core=debug).\n\nExamples:\n  pfsim run --trace misses.json\n  pfsim run --trace misses.json --config dram.json --json\n  pfsim synth --base 0x1000 --stride 64 --count 1000"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON miss trace.
    Run {
        /// Trace file (`{"accesses": [{"addr": ..., "gap": ...}, ...]}`).
        #[arg(short, long)]
        trace: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate and replay a single strided stream.
    Synth {
        /// First miss address (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u64)]
        base: u64,

        /// Distance between consecutive misses.
        #[arg(long, value_parser = parse_u64, default_value = "64")]
        stride: u64,

        /// Number of misses.
        #[arg(long, default_value_t = 1000)]
        count: usize,

        /// Idle cycles after each access.
        #[arg(long, default_value_t = 0)]
        gap: u64,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// JSON configuration; omitted fields take defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print statistics as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Restrict the text report to these sections.
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = clap::builder::PossibleValuesParser::new(STATS_SECTIONS)
    )]
    sections: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { trace, output } => {
            loader::load_trace(&trace).and_then(|t| cmd_run(t, &output))
        }
        Commands::Synth {
            base,
            stride,
            count,
            gap,
            output,
        } => cmd_run(Trace::synthetic_stream(base, stride, count, gap), &output),
    };

    if let Err(e) = result {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Builds the simulator for `trace`, runs it to completion and reports.
fn cmd_run(trace: Trace, output: &OutputArgs) -> Result<(), pfsim_core::common::SimError> {
    let config = match &output.config {
        Some(path) => loader::load_config(path)?,
        None => Config::default(),
    };

    info!(
        accesses = trace.len(),
        table_size = config.prefetcher.table_size,
        threshold = config.prefetcher.threshold,
        "starting simulation"
    );

    let mut sim = Simulator::new(&config, trace)?;
    let stats = sim.run()?;
    report(&stats, output);
    Ok(())
}

fn report(stats: &SimStats, output: &OutputArgs) {
    if output.json {
        match serde_json::to_string_pretty(stats) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("failed to serialize statistics: {e}");
                process::exit(1);
            }
        }
    } else {
        stats.print_sections(&output.sections);
    }
}

/// Parses decimal or `0x`-prefixed hexadecimal.
fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}
