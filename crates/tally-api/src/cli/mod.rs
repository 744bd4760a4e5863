//! CLI command definitions for the `tally` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod memory;
pub mod recurring;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Expense tracker with a memory-backed assistant.
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` in config.toml).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` in config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Copy recurring expenses into the current month.
    Recurring {
        /// Run as if today were this date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Inspect or reset a user's chat memory.
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum MemoryAction {
    /// Show the rolling summary and the most recent turns.
    Show {
        /// Account username.
        username: String,
    },

    /// Forget all turns and the summary.
    Reset {
        /// Account username.
        username: String,

        /// Skip confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}
