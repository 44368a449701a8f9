//! Transports carrying frames to a device.

use bl_requests::ApiClient;
use tracing::{debug, info};

use crate::{frame::Frame, prelude::*};

pub mod serial;

pub use serial::{ResetMode, SerialChannel, available_ports};

/// Where frames go. Cheap to clone, clones share the underlying link.
#[derive(Debug, Clone)]
pub enum Channel {
    /// Serial port, carries line and acknowledged frames.
    Serial(SerialChannel),
    /// HTTP device, carries form frames.
    Http(ApiClient),
    /// Nowhere, frames are only logged.
    Log,
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Serial(_) => "serial",
            Channel::Http(_) => "http",
            Channel::Log => "log",
        }
    }

    /// Deliver one frame. Notes are logged on every channel.
    pub async fn send(&self, frame: &Frame) -> Result<()> {
        match (self, frame) {
            (_, Frame::Note(text)) => {
                info!("{text}");
                Ok(())
            }
            (Channel::Log, frame) => {
                info!("{frame}");
                Ok(())
            }
            (Channel::Serial(serial), Frame::Line(text)) => serial.send_line(text).await,
            (Channel::Serial(serial), Frame::Acked(command)) => serial.send_acked(command).await,
            (Channel::Http(client), Frame::Form(fields)) => {
                let status = client.post_form("", fields).await?;
                debug!("{} accepted update with {status}", client.url());
                Ok(())
            }
            (channel, frame) => Err(Error::UnsupportedFrame {
                channel: channel.name(),
                frame: frame.kind(),
            }),
        }
    }
}
