//! CLI command definitions for the `ussdflow` binary.

pub mod session;
pub mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Serve and try out USSD menu flows.
#[derive(Parser)]
#[command(name = "ussdflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory holding config.toml, the database and the vault key.
    #[arg(long, global = true, env = "USSDFLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Also export spans to stdout as OpenTelemetry traces.
    #[arg(long, global = true, env = "USSDFLOW_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the USSD gateway HTTP server.
    Serve {
        /// Port to listen on (defaults to `server.port` in config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` in config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Run an interactive session in the terminal.
    Simulate {
        /// Session id to use; resume an earlier session by passing its id.
        #[arg(short, long)]
        session: Option<String>,

        /// Keep everything in memory instead of the database.
        #[arg(long)]
        ephemeral: bool,
    },

    /// Show the current screen and cursor of a stored session.
    Inspect {
        /// Session id.
        session: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
