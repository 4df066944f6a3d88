//! Cache hierarchy simulator CLI.
//!
//! This binary replays a memory trace through a configured cache hierarchy. It performs:
//! 1. **Config load:** Text (`<label> <blockSize> <waysPerSet> <sizeInKiB>` per level) or JSON.
//! 2. **Replay:** Each `R|W <hex-address>` line is fed to the nearest level.
//! 3. **Output:** One line of per-level codes per access (0 no-action, 1 read hit,
//!    2 read miss, 3 write hit, 4 write miss), written to `<TRACE>.out` by default.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cachesim_core::config::HierarchyConfig;
use cachesim_core::sim::{Simulator, output_path_for};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven multi-level cache hierarchy simulator",
    long_about = "Replay a memory trace through a chain of set-associative caches and record, per access, how each level classified it.\n\nExamples:\n  cachesim cacheconfig.txt trace.txt\n  cachesim hierarchy.json trace.txt -o results.out --stats"
)]
struct Cli {
    /// Cache config: one `<label> <blockSize> <waysPerSet> <sizeInKiB>` line per level, or a `.json` file.
    config: PathBuf,

    /// Memory trace: one `<R|W> <hex-address>` line per access.
    trace: PathBuf,

    /// Output file (defaults to `<TRACE>.out`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print hit/miss statistics after the replay.
    #[arg(long)]
    stats: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Installs a stderr subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config, replays the trace and writes the output file.
fn run(cli: &Cli) -> cachesim_core::common::Result<()> {
    let config = HierarchyConfig::load(&cli.config)?;
    let mut sim = Simulator::from_config(&config)?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| output_path_for(&cli.trace));
    let reader = BufReader::new(File::open(&cli.trace)?);
    let writer = BufWriter::new(File::create(&output)?);

    let count = sim.run(reader, writer)?;
    info!(accesses = count, output = %output.display(), "results written");

    if cli.stats {
        sim.stats().print();
    }
    Ok(())
}
