//! Command-line interface for the build lights watcher.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the build lights watcher.
#[derive(Parser)]
#[command(name = "blw")]
#[command(about = "Build lights watcher - show build server health on indicator lights")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "blw.toml")]
    pub config: PathBuf,

    /// Build server user (can also be set via BLW_USER environment variable)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Build server API token (can also be set via BLW_TOKEN environment variable)
    #[arg(short, long)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the build lights watcher.
#[derive(Subcommand)]
pub enum Commands {
    /// Poll the build server and drive the lights until interrupted
    Run,
    /// Parse, validate and print the configuration file
    Parse,
    /// Turn every lamp off and exit
    Off,
    /// List the serial ports present on this machine
    Ports,
}
