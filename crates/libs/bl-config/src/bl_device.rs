//! Indicator device configuration.
//!
//! The user form keeps every tunable optional so a minimal `[device]` table
//! works; [`BlDevice::from_user_device`] fills in the defaults each piece of
//! hardware ships with and rejects values the firmware cannot represent.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// The dual RGB firmware addresses lamps with a single hex digit.
pub const DUAL_RGB_MAX_LAMPS: usize = 16;
/// Ring and blink patterns understood by the gauge, launchpad and NeoPixel firmware.
pub const MAX_SIGNAL_PATTERN: u8 = 9;

const DEFAULT_LED_STRIP_URL: &str = "http://arduino_led_strip.local/";

/// Device section as written in the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlUserDevice {
    /// Arduino driven lamp with two or more RGB bulbs.
    DualRgb {
        port: String,
        baud: Option<u32>,
        lamps: Option<usize>,
        can_reset: Option<bool>,
    },
    /// Analog gauge with a servo needle, red/green leds and a bell.
    Gauge {
        port: String,
        baud: Option<u32>,
        failure_pattern: Option<u8>,
        partial_pattern: Option<u8>,
        bell_ms: Option<u64>,
    },
    /// Single RGB led board.
    Launchpad {
        port: String,
        baud: Option<u32>,
        failure_pattern: Option<u8>,
        partial_pattern: Option<u8>,
    },
    /// Serial attached pixel strip, one pixel per build.
    NeoPixel {
        port: String,
        baud: Option<u32>,
        lamps: Option<usize>,
        building_pattern: Option<u8>,
    },
    /// Network attached led strip driven with form posts.
    LedStrip {
        url: Option<String>,
        lamps: Option<usize>,
    },
    /// Log only, no hardware.
    Simulated,
}

/// Serial connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlSerial {
    pub port: String,
    pub baud: u32,
}

/// Device configuration with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlDevice {
    DualRgb {
        serial: BlSerial,
        lamps: usize,
        can_reset: bool,
    },
    Gauge {
        serial: BlSerial,
        failure_pattern: u8,
        partial_pattern: u8,
        bell_ms: u64,
    },
    Launchpad {
        serial: BlSerial,
        failure_pattern: u8,
        partial_pattern: u8,
    },
    NeoPixel {
        serial: BlSerial,
        lamps: usize,
        building_pattern: u8,
    },
    LedStrip {
        url: String,
        lamps: usize,
    },
    Simulated,
}

fn pattern(field: &'static str, value: Option<u8>, default: u8) -> Result<u8> {
    let value = value.unwrap_or(default);
    if value > MAX_SIGNAL_PATTERN {
        return Err(Error::invalid(
            field,
            format!("{value} is outside 0..={MAX_SIGNAL_PATTERN}"),
        ));
    }
    Ok(value)
}

fn lamps(field: &'static str, value: Option<usize>, default: usize) -> Result<usize> {
    match value.unwrap_or(default) {
        0 => Err(Error::invalid(field, "a device needs at least one lamp")),
        n => Ok(n),
    }
}

fn serial(port: String, baud: Option<u32>, default_baud: u32) -> Result<BlSerial> {
    if port.trim().is_empty() {
        return Err(Error::invalid("device.port", "must name a serial port"));
    }
    Ok(BlSerial {
        port,
        baud: baud.unwrap_or(default_baud),
    })
}

impl BlDevice {
    /// Apply hardware defaults and range checks to a user device section.
    pub fn from_user_device(device: BlUserDevice) -> Result<Self> {
        Ok(match device {
            BlUserDevice::DualRgb {
                port,
                baud,
                lamps: n,
                can_reset,
            } => {
                let lamps = lamps("device.lamps", n, 2)?;
                if lamps > DUAL_RGB_MAX_LAMPS {
                    return Err(Error::invalid(
                        "device.lamps",
                        format!("dual rgb firmware supports at most {DUAL_RGB_MAX_LAMPS} lamps"),
                    ));
                }
                BlDevice::DualRgb {
                    serial: serial(port, baud, 19200)?,
                    lamps,
                    can_reset: can_reset.unwrap_or(false),
                }
            }
            BlUserDevice::Gauge {
                port,
                baud,
                failure_pattern,
                partial_pattern,
                bell_ms,
            } => BlDevice::Gauge {
                serial: serial(port, baud, 9600)?,
                failure_pattern: pattern("device.failure_pattern", failure_pattern, 5)?,
                partial_pattern: pattern("device.partial_pattern", partial_pattern, 2)?,
                bell_ms: bell_ms.unwrap_or(3000),
            },
            BlUserDevice::Launchpad {
                port,
                baud,
                failure_pattern,
                partial_pattern,
            } => BlDevice::Launchpad {
                serial: serial(port, baud, 9600)?,
                failure_pattern: pattern("device.failure_pattern", failure_pattern, 3)?,
                partial_pattern: pattern("device.partial_pattern", partial_pattern, 2)?,
            },
            BlUserDevice::NeoPixel {
                port,
                baud,
                lamps: n,
                building_pattern,
            } => BlDevice::NeoPixel {
                serial: serial(port, baud, 9600)?,
                lamps: lamps("device.lamps", n, 40)?,
                building_pattern: pattern("device.building_pattern", building_pattern, 3)?,
            },
            BlUserDevice::LedStrip { url, lamps: n } => BlDevice::LedStrip {
                url: url
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| String::from(DEFAULT_LED_STRIP_URL)),
                lamps: lamps("device.lamps", n, 30)?,
            },
            BlUserDevice::Simulated => BlDevice::Simulated,
        })
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BlDevice::DualRgb { .. } => "dual_rgb",
            BlDevice::Gauge { .. } => "gauge",
            BlDevice::Launchpad { .. } => "launchpad",
            BlDevice::NeoPixel { .. } => "neo_pixel",
            BlDevice::LedStrip { .. } => "led_strip",
            BlDevice::Simulated => "simulated",
        }
    }

    /// How many build sets the device can show side by side.
    pub fn max_lamps(&self) -> usize {
        match self {
            BlDevice::DualRgb { lamps, .. }
            | BlDevice::NeoPixel { lamps, .. }
            | BlDevice::LedStrip { lamps, .. } => *lamps,
            BlDevice::Gauge { .. } | BlDevice::Launchpad { .. } => 1,
            BlDevice::Simulated => usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dual_rgb_defaults() -> Result<()> {
        let device = BlDevice::from_user_device(BlUserDevice::DualRgb {
            port: String::from("/dev/ttyUSB0"),
            baud: None,
            lamps: None,
            can_reset: None,
        })?;
        assert_eq!(
            device,
            BlDevice::DualRgb {
                serial: BlSerial {
                    port: String::from("/dev/ttyUSB0"),
                    baud: 19200,
                },
                lamps: 2,
                can_reset: false,
            }
        );
        Ok(())
    }

    #[test]
    fn dual_rgb_lamp_count_limited_to_one_hex_digit() {
        let result = BlDevice::from_user_device(BlUserDevice::DualRgb {
            port: String::from("COM3"),
            baud: None,
            lamps: Some(32),
            can_reset: None,
        });
        assert!(matches!(
            result,
            Err(Error::Invalid {
                field: "device.lamps",
                ..
            })
        ));
    }

    #[test]
    fn pattern_above_nine_is_rejected() {
        let result = BlDevice::from_user_device(BlUserDevice::Launchpad {
            port: String::from("COM4"),
            baud: None,
            failure_pattern: Some(12),
            partial_pattern: None,
        });
        assert!(matches!(
            result,
            Err(Error::Invalid {
                field: "device.failure_pattern",
                ..
            })
        ));
    }

    #[test]
    fn led_strip_falls_back_to_default_url() -> Result<()> {
        let device = BlDevice::from_user_device(BlUserDevice::LedStrip {
            url: Some(String::new()),
            lamps: Some(8),
        })?;
        assert_eq!(
            device,
            BlDevice::LedStrip {
                url: String::from(DEFAULT_LED_STRIP_URL),
                lamps: 8,
            }
        );
        Ok(())
    }

    #[test]
    fn single_lamp_devices() -> Result<()> {
        let device = BlDevice::from_user_device(BlUserDevice::Launchpad {
            port: String::from("COM4"),
            baud: None,
            failure_pattern: None,
            partial_pattern: None,
        })?;
        assert_eq!(device.max_lamps(), 1);
        assert_eq!(BlDevice::Simulated.max_lamps(), usize::MAX);
        Ok(())
    }

    #[test]
    fn missing_port_is_rejected() {
        let result = BlDevice::from_user_device(BlUserDevice::Gauge {
            port: String::new(),
            baud: None,
            failure_pattern: None,
            partial_pattern: None,
            bell_ms: None,
        });
        assert!(result.is_err());
    }
}
