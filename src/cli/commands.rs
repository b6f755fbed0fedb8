//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ledger source connector CLI
#[derive(Parser, Debug)]
#[command(name = "source-ledger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// State file (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Include debug log messages in the output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test credentials against the token endpoint
    Check {
        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// Discover available streams
    Discover {
        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// Read data from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,

        /// Emit state after each page
        #[arg(long)]
        state_per_page: bool,
    },

    /// Show connector specification
    Spec,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
