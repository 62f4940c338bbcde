//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bananatag API command-line client
#[derive(Parser, Debug)]
#[command(name = "btag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call an endpoint and print each page
    Request {
        /// Endpoint path, e.g. `tags` or `stats/aggregate`
        endpoint: String,

        /// Request parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Follow pagination to the last page
        #[arg(long)]
        all: bool,
    },

    /// Build a message and print it base64-encoded
    BuildMessage {
        /// Message fields (JSON)
        #[arg(long)]
        fields: PathBuf,
    },

    /// Build a message and submit it for sending
    Send {
        /// Message fields (JSON)
        #[arg(long)]
        fields: PathBuf,

        /// Sending account (defaults to the message's `from`)
        #[arg(long)]
        sender: Option<String>,

        /// Disable open and click tracking
        #[arg(long)]
        no_track: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one body per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `key=value` request parameter
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
