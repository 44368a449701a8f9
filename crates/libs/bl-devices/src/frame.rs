//! Device commands produced by the encoders.

use std::{fmt, time::Duration};

/// One command for a device, transient and re-sent every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Raw bytes answered by an echo of the command plus one status byte.
    Acked(Vec<u8>),
    /// Text command, terminated with a carriage return on the wire.
    Line(String),
    /// Fields posted as an url encoded form.
    Form(Vec<(String, String)>),
    /// Nothing goes on the wire, the device only reports.
    Note(String),
    /// Send `frame` once after `after`, replacing any earlier delayed frame.
    Delayed { after: Duration, frame: Box<Frame> },
}

impl Frame {
    pub fn line(text: impl Into<String>) -> Self {
        Frame::Line(text.into())
    }

    /// Frame kind for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Acked(_) => "acked",
            Frame::Line(_) => "line",
            Frame::Form(_) => "form",
            Frame::Note(_) => "note",
            Frame::Delayed { .. } => "delayed",
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Acked(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Frame::Line(text) | Frame::Note(text) => write!(f, "{text}"),
            Frame::Form(fields) => write!(f, "form with {} field(s)", fields.len()),
            Frame::Delayed { after, frame } => write!(f, "{frame} after {after:?}"),
        }
    }
}
