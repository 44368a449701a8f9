//! Watcher error types.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The build server could not be queried.
    #[error(transparent)]
    Source(#[from] bl_requests::Error),

    /// The indicator device failed.
    #[error(transparent)]
    Device(#[from] bl_devices::error::Error),

    /// A build set pattern is not a valid glob.
    #[error("Invalid pattern {pattern:?} for build set {set} - {source}")]
    Pattern {
        set: String,
        pattern: String,
        source: glob::PatternError,
    },

    /// `fetch` was called before a successful `connect`.
    #[error("Build server {0} is not connected")]
    NotConnected(String),
}

impl Error {
    /// Failures the poll loop survives by showing a problem and backing off:
    /// anything the build server or the device link may recover from.
    /// Everything else is a configuration or programming error.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Source(bl_requests::Error::Client(_)) => false,
            Error::Source(_) => true,
            Error::Device(err) => err.is_communication(),
            Error::NotConnected(_) => true,
            Error::Pattern { .. } => false,
        }
    }
}
