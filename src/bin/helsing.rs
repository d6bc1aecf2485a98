//! CLI front-end: parses arguments, builds an `EngineConfig`, and dispatches
//! to the driver. Kept thin — every fallible or interesting operation lives
//! in the library.

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::info;

use helsing::config::{EngineConfig, TilingPolicy, Verbosity};
use helsing::error::VampireError;
use helsing::fingerprint::{Encoding, Wide};

/// Parallel vampire number search engine.
#[derive(Parser, Debug)]
#[command(name = "helsing", version, about)]
struct Cli {
    /// Lower bound of the search interval, inclusive.
    min: u64,

    /// Upper bound of the search interval, inclusive.
    max: u64,

    /// Worker thread count. Defaults to the available parallelism.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output mode.
    #[arg(short = 'm', long = "mode", value_enum, default_value = "count-vampires")]
    mode: Verbosity,

    /// Minimum distinct fang pairs a product needs before it is reported.
    #[arg(long, default_value_t = 1)]
    min_fang_pairs: u8,

    /// Fixed tile size overriding auto-tiling.
    #[arg(long)]
    tile_size: Option<u64>,

    /// Print an order-preserving FNV-1a checksum of the result stream to stderr.
    #[arg(long)]
    checksum: bool,

    /// Persist/resume progress at this path.
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn decimal_length(n: u64) -> u32 {
    if n == 0 {
        1
    } else {
        n.ilog10() + 1
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "helsing=info",
        1 => "helsing=debug",
        _ => "helsing=trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if decimal_length(cli.max) > Wide::MAX_SAFE_DIGITS {
        return Err(VampireError::CapacityExceeded {
            max: cli.max,
            limit: Wide::MAX_SAFE_DIGITS,
            encoding: Wide::NAME,
        }
        .into());
    }
    if cli.min > cli.max {
        return Err(VampireError::InputRange {
            min: cli.min,
            max: cli.max,
        }
        .into());
    }

    let threads = cli.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let tiling = match cli.tile_size {
        Some(n) => TilingPolicy::Fixed(n),
        None => TilingPolicy::Auto,
    };

    let config = EngineConfig {
        threads,
        verbosity: cli.mode,
        min_fang_pairs: cli.min_fang_pairs,
        tiling,
        checksum: cli.checksum,
        checkpoint: cli.checkpoint,
    };

    info!("Checking interval: [{}, {}]", cli.min, cli.max);
    let summary = helsing::search(cli.min, cli.max, &config)?;

    match config.verbosity {
        Verbosity::CountPairs => eprintln!("Found: {} valid fang pairs.", summary.count),
        Verbosity::CountVampires => eprintln!("Found: {} vampire numbers.", summary.count),
        Verbosity::DumpPairs | Verbosity::PrintVampires => {}
    }
    if let Some(checksum) = summary.checksum {
        eprintln!("Checksum: {checksum}");
    }

    Ok(())
}
