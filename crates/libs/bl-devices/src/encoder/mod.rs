//! Indicator protocol encoders.
//!
//! An encoder turns a [`BuildSetSummary`] for one lamp into the frames a
//! particular piece of hardware understands. Encoders are pure: the same
//! input always yields the same frames, and nothing is remembered between
//! calls. Callers only pass lamp indexes below [`Capabilities::max_lamps`];
//! the [`DeviceDriver`](crate::driver::DeviceDriver) drops everything else.

use crate::{frame::Frame, prelude::*, summary::BuildSetSummary};

pub mod dual_rgb;
pub mod gauge;
pub mod launchpad;
pub mod led_strip;
pub mod neo_pixel;
pub mod simulated;

pub use dual_rgb::DualRgb;
pub use gauge::Gauge;
pub use launchpad::Launchpad;
pub use led_strip::LedStrip;
pub use neo_pixel::NeoPixel;
pub use simulated::Simulated;

/// What a device can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Number of addressable lamps (or build set slots) on the device.
    pub max_lamps: usize,
}

/// Translates build counts into device commands.
pub trait IndicatorEncoder: Send + Sync {
    /// Short device name used in logs.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    /// Frames showing `summary` on `lamp`.
    fn indicate(&self, lamp: usize, summary: &BuildSetSummary) -> Result<Vec<Frame>>;

    /// Frames showing that the build server could not be read.
    fn indicate_problem(&self, lamp: usize) -> Result<Vec<Frame>>;

    /// Frames turning every lamp off.
    fn all_off(&self) -> Result<Vec<Frame>>;
}
