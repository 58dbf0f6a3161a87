//! CLI command definitions for the `tunebot` binary.
//!
//! `tunebot serve` runs the HTTP API; `chat`, `auto` and `stop` are terminal
//! clients that talk to a running server.

pub mod auto;
pub mod chat;
pub mod client;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Default server address used by the client commands.
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// Musician agent server and terminal client.
#[derive(Parser)]
#[command(name = "tunebot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the server configuration file.
    #[arg(long, global = true, env = "TUNEBOT_CONFIG", default_value = "tunebot.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Port to listen on.
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Export spans to stdout through OpenTelemetry.
        #[arg(long)]
        otel: bool,
    },

    /// Chat with the agent. Interactive unless --message is given.
    Chat {
        /// Server base URL.
        #[arg(long, env = "TUNEBOT_URL", default_value = DEFAULT_URL)]
        url: String,

        /// Send a single message and exit.
        #[arg(long, short)]
        message: Option<String>,
    },

    /// Start auto mode and follow its output. Ctrl+C stops the loop.
    Auto {
        /// Server base URL.
        #[arg(long, env = "TUNEBOT_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Stop a running auto loop.
    Stop {
        /// Server base URL.
        #[arg(long, env = "TUNEBOT_URL", default_value = DEFAULT_URL)]
        url: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
