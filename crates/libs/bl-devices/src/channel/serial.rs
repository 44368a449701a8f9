//! Serial port transport.
//!
//! Ports are blocking, so every read and write runs on the blocking pool
//! while the link itself sits behind a mutex shared by clones of the
//! channel (the delayed bell task holds one).

use std::{
    fmt,
    io::{Read, Write},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use tracing::{debug, trace, warn};

use crate::prelude::*;

/// Time the firmware gets to answer before the acknowledgment is read.
pub const ACK_SETTLE: Duration = Duration::from_millis(20);

/// Read timeout for acknowledgments and banners.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Time a resetting board needs after DTR is raised.
const RESET_SETTLE: Duration = Duration::from_millis(250);

/// Printed by boards that reset when the port opens.
const BANNER: &[u8] = b"initialized";

const ACK_OK: u8 = b'+';

/// Anything that moves bytes to and from a device.
pub trait SerialLink: Read + Write + Send {}

impl<T: Read + Write + Send + ?Sized> SerialLink for T {}

/// What to do with the input buffer right after opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Raise DTR, wait for the board to reboot and read its banner.
    Banner,
    /// Throw away whatever is left in the input buffer.
    Drain,
}

type SharedLink = Arc<Mutex<Box<dyn SerialLink>>>;

#[derive(Clone)]
pub struct SerialChannel {
    name: String,
    link: SharedLink,
    settle: Duration,
}

impl fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialChannel")
            .field("name", &self.name)
            .field("settle", &self.settle)
            .finish()
    }
}

impl SerialChannel {
    /// Wrap an already open link.
    pub fn from_link(name: impl Into<String>, link: Box<dyn SerialLink>, settle: Duration) -> Self {
        Self {
            name: name.into(),
            link: Arc::new(Mutex::new(link)),
            settle,
        }
    }

    /// Open `port` at `baud` and bring the input buffer to a known state.
    pub async fn open(port: &str, baud: u32, reset: ResetMode) -> Result<Self> {
        let name = port.to_string();
        let link = tokio::task::spawn_blocking(move || -> Result<Box<dyn SerialLink>> {
            let mut device = serialport::new(&name, baud)
                .timeout(READ_TIMEOUT)
                .open()?;
            match reset {
                ResetMode::Banner => {
                    device.write_data_terminal_ready(true)?;
                    thread::sleep(RESET_SETTLE);
                    let banner = read_banner(&mut device)?;
                    debug!("{name} initialized with {banner:?}");
                }
                ResetMode::Drain => {
                    let pending = device.bytes_to_read()? as usize;
                    let cruft = drain(&mut device, pending)?;
                    if !cruft.is_empty() {
                        debug!("{name} had leftover input {cruft:?}");
                    }
                }
            }
            Ok(Box::new(device))
        })
        .await??;
        Ok(Self::from_link(port, link, ACK_SETTLE))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `text` terminated by a carriage return.
    pub async fn send_line(&self, text: &str) -> Result<()> {
        trace!("{} <- {text}", self.name);
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(b'\r');
        let (name, link) = (self.name.clone(), self.link.clone());
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut link = lock(&name, &link)?;
            link.write_all(&bytes)?;
            link.flush()?;
            Ok(())
        })
        .await?
    }

    /// Write `command` and read back its echo plus the status byte.
    pub async fn send_acked(&self, command: &[u8]) -> Result<()> {
        trace!("{} <- {}", self.name, String::from_utf8_lossy(command));
        let command = command.to_vec();
        let (name, link, settle) = (self.name.clone(), self.link.clone(), self.settle);
        let reply = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let mut link = lock(&name, &link)?;
            link.write_all(&command)?;
            link.flush()?;
            thread::sleep(settle);
            let mut reply = vec![0; command.len() + 1];
            link.read_exact(&mut reply)?;
            check_ack(&command, &reply)?;
            Ok(reply)
        })
        .await??;
        trace!("{} -> {}", self.name, String::from_utf8_lossy(&reply));
        if reply.last() != Some(&ACK_OK) {
            warn!(
                "{} did not understand {}",
                self.name,
                String::from_utf8_lossy(&reply[..reply.len() - 1])
            );
        }
        Ok(())
    }
}

fn lock<'a>(
    name: &str,
    link: &'a SharedLink,
) -> Result<std::sync::MutexGuard<'a, Box<dyn SerialLink>>> {
    link.lock()
        .map_err(|_| Error::LinkPoisoned(name.to_string()))
}

fn read_banner(link: &mut impl Read) -> Result<String> {
    let mut banner = vec![0; BANNER.len()];
    link.read_exact(&mut banner)?;
    Ok(String::from_utf8_lossy(&banner).into_owned())
}

fn drain(link: &mut impl Read, pending: usize) -> Result<String> {
    let mut cruft = vec![0; pending];
    link.read_exact(&mut cruft)?;
    Ok(String::from_utf8_lossy(&cruft).into_owned())
}

/// The firmware echoes the command before its status byte.
fn check_ack(sent: &[u8], received: &[u8]) -> Result<()> {
    if received.len() != sent.len() + 1 || &received[..sent.len()] != sent {
        return Err(Error::BadAck {
            sent: String::from_utf8_lossy(sent).into_owned(),
            received: String::from_utf8_lossy(received).into_owned(),
        });
    }
    Ok(())
}

/// Names of the serial ports present on this machine.
pub fn available_ports() -> Result<Vec<String>> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|port| port.port_name)
        .collect())
}

#[cfg(test)]
pub(crate) mod mock {
    use std::{
        collections::VecDeque,
        io,
        sync::{Arc, Mutex},
    };

    /// In memory link. With `echo` set every write is answered with the
    /// written bytes plus `+`, the way the dual RGB firmware does.
    #[derive(Clone, Default)]
    pub(crate) struct MockLink {
        pub written: Arc<Mutex<Vec<u8>>>,
        pub replies: Arc<Mutex<VecDeque<u8>>>,
        pub echo: bool,
    }

    impl MockLink {
        pub fn echoing() -> Self {
            Self {
                echo: true,
                ..Self::default()
            }
        }

        pub fn lines(&self) -> Vec<String> {
            let written = self.written.lock().expect("written");
            String::from_utf8_lossy(&written)
                .split('\r')
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()
        }

        pub fn sent(&self) -> Vec<u8> {
            self.written.lock().expect("written").clone()
        }
    }

    impl io::Read for MockLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut replies = self.replies.lock().expect("replies");
            if replies.is_empty() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no reply"));
            }
            let mut count = 0;
            while count < buf.len() {
                match replies.pop_front() {
                    Some(byte) => {
                        buf[count] = byte;
                        count += 1;
                    }
                    None => break,
                }
            }
            Ok(count)
        }
    }

    impl io::Write for MockLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.lock().expect("written").extend_from_slice(buf);
            if self.echo {
                let mut replies = self.replies.lock().expect("replies");
                replies.extend(buf.iter().copied());
                replies.push_back(b'+');
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
