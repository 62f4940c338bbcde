//! CLI module
//!
//! Command-line interface for calling the API.
//!
//! # Commands
//!
//! - `request` - Fetch an endpoint, optionally following every page
//! - `build-message` - Print the encoded form of a message
//! - `send` - Build a message and submit it for sending

mod commands;
mod runner;

pub use commands::{parse_param, Cli, Commands, OutputFormat};
pub use runner::Runner;
