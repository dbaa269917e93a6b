//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Product tracking station.
///
/// Times how long each scanned product takes, rates it against the optimal
/// processing time and stores completed records in the record service.
#[derive(Debug, Parser)]
#[command(name = "pt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read barcodes from stdin and time each product.
    Scan {
        /// Close and store the last product when input ends.
        #[arg(long)]
        record_on_exit: bool,
    },

    /// Rate an elapsed time against the optimal threshold.
    Classify {
        /// Elapsed time in seconds.
        elapsed: u64,

        /// Optimal time in seconds (defaults to the configured value).
        #[arg(long, allow_negative_numbers = true)]
        optimal: Option<f64>,
    },

    /// Show the number of stored records.
    Count,

    /// Show today's statistics.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Rewrite the record service's CSV storage.
    Recreate,

    /// Download the records as CSV.
    Export {
        /// Where to write the file (defaults to the server's file name).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
