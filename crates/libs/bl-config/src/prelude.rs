//! Error and result aliases shared by the configuration modules.

pub use crate::error::Error;

/// Result type for configuration loading and validation.
pub type Result<T> = core::result::Result<T, Error>;
