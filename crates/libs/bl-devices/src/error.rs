//! Device error types.

/// Device errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O on the device channel failed, including read timeouts.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// The serial port could not be opened or configured.
    #[error(transparent)]
    Serial(#[from] serialport::Error),

    /// The network device did not accept the request.
    #[error(transparent)]
    Http(#[from] bl_requests::Error),

    /// A blocking channel task panicked or was cancelled.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    /// The serial link mutex was poisoned by a panicking writer.
    #[error("Serial link {0} is poisoned")]
    LinkPoisoned(String),

    /// The device answered with something other than the echoed command.
    #[error("Acknowledgment {received:?} does not echo command {sent:?}")]
    BadAck { sent: String, received: String },

    /// Value outside the single hex digit range the firmware accepts.
    #[error("{0} is out of single digit hex range")]
    InvalidNibble(usize),

    /// Counts that cannot describe a real build set.
    #[error(
        "Inconsistent build set summary: total {total}, success {success}, partial {partial}, building {building}"
    )]
    InconsistentSummary {
        total: usize,
        success: usize,
        partial: usize,
        building: usize,
    },

    /// Frame kind the channel cannot carry, a wiring mistake.
    #[error("{channel} channel cannot carry {frame} frames")]
    UnsupportedFrame {
        channel: &'static str,
        frame: &'static str,
    },
}

impl Error {
    /// True for failures of the link to the device, which the poll loop
    /// reports and retries instead of giving up.
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            Error::IO(_)
                | Error::Serial(_)
                | Error::Http(_)
                | Error::Join(_)
                | Error::LinkPoisoned(_)
                | Error::BadAck { .. }
        )
    }
}
