//! Build light indicator devices.
//!
//! A device is split in two: an [`IndicatorEncoder`](encoder::IndicatorEncoder)
//! that turns build counts into [`Frame`](frame::Frame)s, and a
//! [`Channel`](channel::Channel) that carries them over a serial port, HTTP or
//! the log. [`DeviceDriver`](driver::DeviceDriver) glues the two together.

pub mod channel;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod hex;
pub mod prelude;
pub mod summary;

pub use driver::DeviceDriver;
pub use summary::{BuildSetSummary, Health};
