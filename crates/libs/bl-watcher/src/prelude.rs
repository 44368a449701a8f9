//! Error and result aliases for the watcher crate.

pub use crate::error::Error;

pub type Result<T> = core::result::Result<T, Error>;
