//! Build Lights Watcher (blw)
//!
//! Polls a Jenkins server for the last two builds of every job in each
//! configured build set and shows the health of each set on a lamp of an
//! indicator device:
//!
//! - **Run**: Watch the build server until Ctrl-C, then turn the lamps off
//! - **Parse**: Validate the configuration file and print it
//! - **Off**: Turn every lamp off
//! - **Ports**: List the serial ports a device could be attached to
//!
//! Supported devices are the dual RGB lamp, the analog gauge, the launchpad
//! board, NeoPixel strips on a serial port, the network LED strip and a
//! simulated device that only logs. An optional status page renders the
//! latest results as an HTML table.

mod cli;
mod commands;
mod error;
mod prelude;
mod status_page;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{handle_off, handle_parse, handle_ports, handle_run, load_config};
use crate::prelude::*;

/// Main entry point for the Build Lights Watcher.
///
/// ```bash
/// # Check the configuration
/// blw --config blw.toml parse
///
/// # Watch the build server
/// BLW_TOKEN=secret blw --config blw.toml --user ci run
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=info,bl_config=info,bl_devices=info,bl_watcher=info,tower_http=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Commands::Ports = cli.command {
        return handle_ports();
    }

    let config = load_config(&cli.config, cli.user, cli.token)?;
    match cli.command {
        Commands::Run => handle_run(config).await,
        Commands::Parse => handle_parse(&config),
        Commands::Off => handle_off(&config).await,
        Commands::Ports => handle_ports(),
    }
}
