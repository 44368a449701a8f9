//! Command handlers for the build lights watcher.

use std::path::Path;

use bl_config::{BlConfig, BlUserConfig};
use bl_devices::{DeviceDriver, channel::available_ports};
use bl_watcher::{JenkinsSource, PollLoop, StatusCache};
use tracing::{Span, error, info, info_span};

use crate::{prelude::*, status_page};

const USER_VAR: &str = "BLW_USER";
const TOKEN_VAR: &str = "BLW_TOKEN";

/// Loads the configuration file, letting `--user`/`--token` and then the
/// `BLW_USER`/`BLW_TOKEN` environment variables override the credentials it
/// contains.
pub fn load_config(path: &Path, user: Option<String>, token: Option<String>) -> Result<BlConfig> {
    let mut config = BlUserConfig::from_file(path)?;
    override_credentials(
        &mut config,
        user.or_else(|| std::env::var(USER_VAR).ok()),
        token.or_else(|| std::env::var(TOKEN_VAR).ok()),
    );
    Ok(BlConfig::from_user_config(config)?)
}

fn override_credentials(config: &mut BlUserConfig, user: Option<String>, token: Option<String>) {
    if user.is_some() {
        config.source.user = user;
    }
    if token.is_some() {
        config.source.token = token;
    }
}

/// Prints the validated configuration, credentials masked.
pub fn handle_parse(config: &BlConfig) -> Result<()> {
    println!("Configuration parsed successfully");
    println!("Build sets: {}", config.build_sets.len());
    for (lamp, set) in config.build_sets.iter().enumerate() {
        println!("  Lamp {lamp}: {} ({})", set.name, set.effective_pattern());
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn handle_ports() -> Result<()> {
    let ports = available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}

fn device_span(config: &BlConfig) -> Span {
    info_span!("device", kind = config.device.kind())
}

/// Opens the device, which turns every lamp off, and closes it again.
pub async fn handle_off(config: &BlConfig) -> Result<()> {
    let mut driver = DeviceDriver::open(&config.device, device_span(config)).await?;
    driver.shutdown().await?;
    Ok(())
}

/// Polls until Ctrl-C or an error retrying cannot fix, then turns the lamps off.
pub async fn handle_run(config: BlConfig) -> Result<()> {
    let source = JenkinsSource::new(&config.source, &config.build_sets)?;
    let driver = DeviceDriver::open(&config.device, device_span(&config)).await?;

    let cache = StatusCache::new();
    if let Some(bind) = config.status_page {
        if let Err(err) = status_page::serve(bind, cache.clone()).await {
            error!("Status page unavailable on {bind} - {err}");
        }
    }

    let mut poll = PollLoop::new(source, driver, config.build_sets)
        .with_timing(config.poll_interval, config.backoff)
        .with_cache(cache)
        .with_span(info_span!("watcher", source = %config.source.url));

    let result = tokio::select! {
        result = poll.run() => result.map_err(Error::from),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    };
    if let Err(err) = &result {
        error!("Watcher stopped - {err}");
    }
    poll.shutdown().await?;
    result
}
