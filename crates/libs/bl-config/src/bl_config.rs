//! Core configuration types for the build lights watcher.

use std::{net::SocketAddr, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    bl_build_set::BlBuildSet,
    bl_device::{BlDevice, BlUserDevice},
    prelude::*,
};

/// Build server connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlUserSource {
    /// Base url of the build server, e.g. `https://ci.example.com`.
    pub url: String,
    /// Optional user name, can be overridden with `BLW_USER`.
    pub user: Option<String>,
    /// Optional API token or password, can be overridden with `BLW_TOKEN`.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Poll loop timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlUserPoll {
    /// Pause between two sweeps over every build set.
    pub interval_secs: Option<u64>,
    /// Pause after the build server or the device failed, gives the server time to recover.
    pub backoff_secs: Option<u64>,
}

/// Optional status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlUserStatusPage {
    /// Address the status page listens on, e.g. `127.0.0.1:8080`.
    pub bind: String,
}

/// User-provided configuration from TOML files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlUserConfig {
    pub source: BlUserSource,
    #[serde(default)]
    pub poll: BlUserPoll,
    pub device: BlUserDevice,
    pub status_page: Option<BlUserStatusPage>,
    pub build_sets: Vec<BlBuildSet>,
}

/// Build server settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlSource {
    pub url: String,
    pub user: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Validated configuration consumed by the watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlConfig {
    pub source: BlSource,
    pub poll_interval: Duration,
    pub backoff: Duration,
    pub device: BlDevice,
    pub status_page: Option<SocketAddr>,
    pub build_sets: Vec<BlBuildSet>,
}

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_BACKOFF_SECS: u64 = 120;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

fn non_zero_secs(field: &'static str, value: Option<u64>, default: u64) -> Result<Duration> {
    match value.unwrap_or(default) {
        0 => Err(Error::invalid(field, "must be at least one second")),
        secs => Ok(Duration::from_secs(secs)),
    }
}

impl BlConfig {
    /// Convert user configuration to the validated configuration.
    ///
    /// Fails on anything the watcher could only trip over at runtime: zero
    /// intervals, no build sets or more than the device has lamps for, an
    /// unparseable status page address, or a device setting outside what the
    /// firmware accepts.
    pub fn from_user_config(config: BlUserConfig) -> Result<Self> {
        let url = config.source.url.trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(Error::invalid("source.url", "must not be empty"));
        }
        if config.build_sets.is_empty() {
            return Err(Error::invalid(
                "build_sets",
                "at least one build set is required",
            ));
        }
        for set in &config.build_sets {
            set.validate()?;
        }

        let status_page = match config.status_page {
            Some(page) => Some(page.bind.parse::<SocketAddr>().map_err(|err| {
                Error::invalid("status_page.bind", format!("{}: {err}", page.bind))
            })?),
            None => None,
        };

        let config = Self {
            source: BlSource {
                url,
                user: config.source.user,
                token: config.source.token,
                timeout: non_zero_secs(
                    "source.timeout_secs",
                    config.source.timeout_secs,
                    DEFAULT_TIMEOUT_SECS,
                )?,
            },
            poll_interval: non_zero_secs(
                "poll.interval_secs",
                config.poll.interval_secs,
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            backoff: non_zero_secs(
                "poll.backoff_secs",
                config.poll.backoff_secs,
                DEFAULT_BACKOFF_SECS,
            )?,
            device: BlDevice::from_user_device(config.device)?,
            status_page,
            build_sets: config.build_sets,
        };
        if config.build_sets.len() > config.device.max_lamps() {
            return Err(Error::invalid(
                "build_sets",
                format!(
                    "{} build sets do not fit a {} device with {} lamp(s)",
                    config.build_sets.len(),
                    config.device.kind(),
                    config.device.max_lamps()
                ),
            ));
        }
        info!(
            "Loaded configuration for {} build set(s) on a {} device",
            config.build_sets.len(),
            config.device.kind()
        );
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        Self::from_user_config(BlUserConfig::from_file(file_path)?)
    }

    /// Render the configuration back to TOML, credentials masked.
    pub fn to_toml(&self) -> Result<String> {
        let mut masked = self.clone();
        if masked.source.token.is_some() {
            masked.source.token = Some(String::from("********"));
        }
        Ok(toml::to_string_pretty(&masked)?)
    }
}

impl BlUserConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }
    /// Parse configuration from TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::bl_device::BlSerial;

    const SAMPLE: &str = r#"
        # Build lights configuration

        [source]
        url = "https://ci.example.com/"
        user = "watcher"
        timeout_secs = 10

        [poll]
        interval_secs = 15
        backoff_secs = 60

        [device]
        kind = "dual_rgb"
        port = "/dev/ttyUSB0"
        lamps = 4
        can_reset = true

        [status_page]
        bind = "127.0.0.1:8080"

        [[build_sets]]
        name = "Core"
        pattern = "core_*"

        [[build_sets]]
        name = "Plugins"
        pattern = "plugins_*"
    "#;

    #[test]
    pub fn deserialize() -> Result<()> {
        let config = BlConfig::from_user_config(BlUserConfig::from_toml(SAMPLE)?)?;

        assert_eq!(config.source.url, "https://ci.example.com");
        assert_eq!(config.source.user.as_deref(), Some("watcher"));
        assert_eq!(config.source.timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.backoff, Duration::from_secs(60));
        assert_eq!(
            config.device,
            BlDevice::DualRgb {
                serial: BlSerial {
                    port: String::from("/dev/ttyUSB0"),
                    baud: 19200,
                },
                lamps: 4,
                can_reset: true,
            }
        );
        assert_eq!(
            config.status_page,
            Some("127.0.0.1:8080".parse().expect("valid address"))
        );
        assert_eq!(config.build_sets.len(), 2);
        assert_eq!(config.build_sets[1].pattern, "plugins_*");
        Ok(())
    }

    #[test]
    fn poll_section_is_optional() -> Result<()> {
        let content = r#"
            [source]
            url = "http://jenkins:8080"

            [device]
            kind = "simulated"

            [[build_sets]]
            name = "Everything"
        "#;
        let config = BlConfig::from_user_config(BlUserConfig::from_toml(content)?)?;
        assert_eq!(
            config.poll_interval,
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );
        assert_eq!(config.backoff, Duration::from_secs(DEFAULT_BACKOFF_SECS));
        assert_eq!(config.device, BlDevice::Simulated);
        assert_eq!(config.status_page, None);
        Ok(())
    }

    #[test]
    fn zero_interval_is_rejected() -> Result<()> {
        let mut user = BlUserConfig::from_toml(SAMPLE)?;
        user.poll.interval_secs = Some(0);
        assert!(matches!(
            BlConfig::from_user_config(user),
            Err(Error::Invalid {
                field: "poll.interval_secs",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn no_build_sets_is_rejected() -> Result<()> {
        let mut user = BlUserConfig::from_toml(SAMPLE)?;
        user.build_sets.clear();
        assert!(BlConfig::from_user_config(user).is_err());
        Ok(())
    }

    #[test]
    fn more_build_sets_than_lamps_is_rejected() -> Result<()> {
        let content = SAMPLE.replace("lamps = 4", "lamps = 1");
        let user = BlUserConfig::from_toml(&content)?;
        assert!(matches!(
            BlConfig::from_user_config(user),
            Err(Error::Invalid {
                field: "build_sets",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn bad_bind_address_is_rejected() -> Result<()> {
        let mut user = BlUserConfig::from_toml(SAMPLE)?;
        user.status_page = Some(BlUserStatusPage {
            bind: String::from("localhost"),
        });
        assert!(matches!(
            BlConfig::from_user_config(user),
            Err(Error::Invalid {
                field: "status_page.bind",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn unknown_device_kind_fails_to_parse() {
        let content = SAMPLE.replace("dual_rgb", "lava_lamp");
        assert!(matches!(
            BlUserConfig::from_toml(&content),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn rendered_config_masks_token() -> Result<()> {
        let mut user = BlUserConfig::from_toml(SAMPLE)?;
        user.source.token = Some(String::from("secret-token"));
        let rendered = BlConfig::from_user_config(user)?.to_toml()?;
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("********"));
        Ok(())
    }

    #[test]
    fn from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;
        let config = BlConfig::from_file(file.path())?;
        assert_eq!(config.build_sets[0].name, "Core");
        Ok(())
    }
}
