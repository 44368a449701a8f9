//! Device driver: an encoder bound to a channel.

use std::time::Duration;

use bl_config::bl_device::BlDevice;
use bl_requests::ApiClient;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, info, warn};

use crate::{
    channel::{Channel, ResetMode, SerialChannel},
    encoder::{
        Capabilities, DualRgb, Gauge, IndicatorEncoder, Launchpad, LedStrip, NeoPixel, Simulated,
    },
    frame::Frame,
    prelude::*,
    summary::BuildSetSummary,
};

/// Request timeout for network attached devices.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends encoder output to the device and owns the pending bell silencer.
pub struct DeviceDriver {
    encoder: Box<dyn IndicatorEncoder>,
    channel: Channel,
    span: Span,
    bell: Option<JoinHandle<()>>,
}

impl DeviceDriver {
    pub fn new(encoder: Box<dyn IndicatorEncoder>, channel: Channel, span: Span) -> Self {
        Self {
            encoder,
            channel,
            span,
            bell: None,
        }
    }

    /// Connect to the configured device and turn every lamp off.
    pub async fn open(device: &BlDevice, span: Span) -> Result<Self> {
        let (encoder, channel): (Box<dyn IndicatorEncoder>, Channel) = match device {
            BlDevice::DualRgb {
                serial,
                lamps,
                can_reset,
            } => {
                let reset = if *can_reset {
                    ResetMode::Banner
                } else {
                    ResetMode::Drain
                };
                let channel = SerialChannel::open(&serial.port, serial.baud, reset).await?;
                (Box::new(DualRgb::new(*lamps)), Channel::Serial(channel))
            }
            BlDevice::Gauge {
                serial,
                failure_pattern,
                partial_pattern,
                bell_ms,
            } => {
                let channel =
                    SerialChannel::open(&serial.port, serial.baud, ResetMode::Drain).await?;
                let encoder = Gauge::new(
                    *failure_pattern,
                    *partial_pattern,
                    Duration::from_millis(*bell_ms),
                );
                (Box::new(encoder), Channel::Serial(channel))
            }
            BlDevice::Launchpad {
                serial,
                failure_pattern,
                partial_pattern,
            } => {
                let channel =
                    SerialChannel::open(&serial.port, serial.baud, ResetMode::Drain).await?;
                (
                    Box::new(Launchpad::new(*failure_pattern, *partial_pattern)),
                    Channel::Serial(channel),
                )
            }
            BlDevice::NeoPixel {
                serial,
                lamps,
                building_pattern,
            } => {
                let channel =
                    SerialChannel::open(&serial.port, serial.baud, ResetMode::Drain).await?;
                (
                    Box::new(NeoPixel::new(*lamps, *building_pattern)),
                    Channel::Serial(channel),
                )
            }
            BlDevice::LedStrip { url, lamps } => {
                let client = ApiClient::new(url.clone(), HTTP_TIMEOUT)?;
                (Box::new(LedStrip::new(*lamps)), Channel::Http(client))
            }
            BlDevice::Simulated => (Box::new(Simulated), Channel::Log),
        };

        let mut driver = Self::new(encoder, channel, span);
        driver.all_off().await?;
        info!(
            parent: &driver.span,
            "Opened {} device over {} with {} lamp(s)",
            driver.encoder.name(),
            driver.channel.name(),
            driver.capabilities().max_lamps
        );
        Ok(driver)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.encoder.capabilities()
    }

    pub fn name(&self) -> &'static str {
        self.encoder.name()
    }

    fn in_range(&self, lamp: usize) -> bool {
        let max_lamps = self.capabilities().max_lamps;
        if lamp >= max_lamps {
            debug!(parent: &self.span, "Ignoring lamp {lamp}, device has {max_lamps}");
            return false;
        }
        true
    }

    /// Show `summary` on `lamp`. Lamps the device does not have are ignored.
    pub async fn indicate(&mut self, lamp: usize, summary: &BuildSetSummary) -> Result<()> {
        if !self.in_range(lamp) {
            return Ok(());
        }
        debug!(parent: &self.span, "Lamp {lamp} {summary}");
        let frames = self.encoder.indicate(lamp, summary)?;
        self.send_all(frames).await
    }

    /// Flag that the build server could not be read for `lamp`.
    pub async fn indicate_problem(&mut self, lamp: usize) -> Result<()> {
        if !self.in_range(lamp) {
            return Ok(());
        }
        debug!(parent: &self.span, "Lamp {lamp} problem");
        let frames = self.encoder.indicate_problem(lamp)?;
        self.send_all(frames).await
    }

    pub async fn all_off(&mut self) -> Result<()> {
        let frames = self.encoder.all_off()?;
        self.send_all(frames).await
    }

    /// Cancel the pending bell silencer and turn every lamp off.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.cancel_bell();
        self.all_off().await?;
        info!(parent: &self.span, "{} device turned off", self.encoder.name());
        Ok(())
    }

    async fn send_all(&mut self, frames: Vec<Frame>) -> Result<()> {
        // Each update replaces the previous one, including its silencer.
        self.cancel_bell();
        let span = self.span.clone();
        for frame in frames {
            match frame {
                Frame::Delayed { after, frame } => self.arm_bell(after, *frame),
                frame => self.channel.send(&frame).instrument(span.clone()).await?,
            }
        }
        Ok(())
    }

    fn arm_bell(&mut self, after: Duration, frame: Frame) {
        self.cancel_bell();
        let channel = self.channel.clone();
        let task = async move {
            tokio::time::sleep(after).await;
            if let Err(err) = channel.send(&frame).await {
                warn!("Failed to send delayed {frame}: {err}");
            }
        };
        self.bell = Some(tokio::spawn(task.instrument(self.span.clone())));
    }

    fn cancel_bell(&mut self) {
        if let Some(bell) = self.bell.take() {
            bell.abort();
        }
    }
}

impl Drop for DeviceDriver {
    fn drop(&mut self) {
        self.cancel_bell();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::serial::mock::MockLink;

    fn serial_driver(encoder: Box<dyn IndicatorEncoder>, link: &MockLink) -> DeviceDriver {
        let channel = SerialChannel::from_link("mock", Box::new(link.clone()), Duration::ZERO);
        DeviceDriver::new(encoder, Channel::Serial(channel), Span::none())
    }

    fn gauge(bell: Duration) -> Box<dyn IndicatorEncoder> {
        Box::new(Gauge::new(5, 2, bell))
    }

    #[tokio::test]
    async fn out_of_range_lamps_are_ignored() -> Result<()> {
        let link = MockLink::echoing();
        let mut driver = serial_driver(Box::new(DualRgb::new(2)), &link);
        driver.indicate(2, &BuildSetSummary::new(1, 1, 0, 0)?).await?;
        driver.indicate_problem(7).await?;
        assert!(link.sent().is_empty());

        let link = MockLink::default();
        let mut driver = serial_driver(gauge(Duration::ZERO), &link);
        driver.indicate(1, &BuildSetSummary::new(1, 0, 0, 0)?).await?;
        driver.indicate_problem(1).await?;
        assert!(link.lines().is_empty());

        let link = MockLink::default();
        let mut driver = serial_driver(Box::new(Launchpad::new(2, 1)), &link);
        driver.indicate(1, &BuildSetSummary::new(1, 0, 0, 0)?).await?;
        driver.indicate_problem(4).await?;
        assert!(link.lines().is_empty());

        let link = MockLink::default();
        let mut driver = serial_driver(Box::new(NeoPixel::new(8, 3)), &link);
        driver.indicate(8, &BuildSetSummary::new(2, 1, 0, 1)?).await?;
        driver.indicate_problem(9).await?;
        assert!(link.lines().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_led_strip_lamps_post_nothing() -> Result<()> {
        // Nothing listens on the discard port, so any post would fail.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1))?;
        let mut driver = DeviceDriver::new(
            Box::new(LedStrip::new(4)),
            Channel::Http(client),
            Span::none(),
        );
        driver.indicate(4, &BuildSetSummary::new(3, 1, 1, 0)?).await?;
        driver.indicate_problem(10).await?;
        Ok(())
    }

    #[tokio::test]
    async fn same_summary_same_wire_output() -> Result<()> {
        let summary = BuildSetSummary::new(5, 3, 1, 1)?;

        let link = MockLink::echoing();
        let mut driver = serial_driver(Box::new(DualRgb::new(2)), &link);
        driver.indicate(1, &summary).await?;
        let first = link.sent();
        link.written.lock().expect("written").clear();
        driver.indicate(1, &summary).await?;
        assert_eq!(link.sent(), first);

        let link = MockLink::default();
        let mut driver = serial_driver(gauge(Duration::ZERO), &link);
        driver.indicate(0, &summary).await?;
        let first = link.sent();
        link.written.lock().expect("written").clear();
        driver.indicate(0, &summary).await?;
        assert_eq!(link.sent(), first);
        Ok(())
    }

    #[tokio::test]
    async fn dual_rgb_waits_for_every_ack() -> Result<()> {
        let link = MockLink::echoing();
        let mut driver = serial_driver(Box::new(DualRgb::new(2)), &link);
        driver.all_off().await?;
        driver.indicate(1, &BuildSetSummary::new(5, 3, 1, 1)?).await?;
        let written = String::from_utf8(link.sent()).expect("ascii");
        assert_eq!(
            written,
            "~c0000;~b0222000;~c1000;~b1222000;~c1D00;~b1333333;"
        );
        assert!(link.replies.lock().expect("replies").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn all_green_gauge_never_rings() -> Result<()> {
        let link = MockLink::default();
        let mut driver = serial_driver(gauge(Duration::from_millis(50)), &link);
        driver.indicate(0, &BuildSetSummary::new(5, 5, 0, 0)?).await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            link.lines(),
            vec!["servo set 0", "led green 1", "bell ring 0"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn bell_is_silenced_after_the_ring_time() -> Result<()> {
        let link = MockLink::default();
        let mut driver = serial_driver(gauge(Duration::from_millis(50)), &link);
        driver.indicate(0, &BuildSetSummary::new(2, 1, 0, 0)?).await?;
        assert_eq!(link.lines().last().map(String::as_str), Some("bell ring 5"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(link.lines().last().map(String::as_str), Some("bell ring 0"));
        Ok(())
    }

    #[tokio::test]
    async fn rearming_replaces_the_pending_silencer() -> Result<()> {
        let link = MockLink::default();
        let mut driver = serial_driver(gauge(Duration::from_millis(100)), &link);
        let failing = BuildSetSummary::new(2, 1, 0, 0)?;
        driver.indicate(0, &failing).await?;
        driver.indicate(0, &failing).await?;
        tokio::time::sleep(Duration::from_millis(400)).await;

        let silences = link
            .lines()
            .iter()
            .filter(|line| *line == "bell ring 0")
            .count();
        assert_eq!(silences, 1);
        Ok(())
    }

    #[tokio::test]
    async fn shutdown_cancels_the_bell_and_turns_off() -> Result<()> {
        let link = MockLink::default();
        let mut driver = serial_driver(gauge(Duration::from_millis(100)), &link);
        driver.indicate(0, &BuildSetSummary::new(2, 0, 2, 0)?).await?;
        driver.shutdown().await?;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(
            link.lines(),
            vec![
                "servo set 100",
                "led red 1",
                "bell ring 2",
                "servo set 0",
                "led off",
                "bell ring 0",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn simulated_device_opens_without_hardware() -> Result<()> {
        let mut driver = DeviceDriver::open(&BlDevice::Simulated, Span::none()).await?;
        assert_eq!(driver.capabilities().max_lamps, usize::MAX);
        driver.indicate(1_000, &BuildSetSummary::new(1, 1, 0, 0)?).await?;
        driver.indicate_problem(3).await?;
        driver.shutdown().await
    }

    #[tokio::test]
    async fn led_strip_posts_forms() -> Result<()> {
        use axum::{Form, Router, routing::post};
        use std::{
            collections::HashMap,
            sync::{Arc, Mutex},
        };

        let posts: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
        let seen = posts.clone();
        let app = Router::new().route(
            "/",
            post(move |Form(fields): Form<HashMap<String, String>>| {
                let seen = seen.clone();
                async move {
                    seen.lock().expect("posts").push(fields);
                    "ok"
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let device = BlDevice::LedStrip {
            url: format!("http://{addr}/"),
            lamps: 4,
        };
        let mut driver = DeviceDriver::open(&device, Span::none()).await?;
        driver.indicate(0, &BuildSetSummary::new(3, 1, 1, 0)?).await?;

        let posts = posts.lock().expect("posts");
        assert_eq!(posts.len(), 2);
        let update = &posts[1];
        assert_eq!(update.get("s0").map(String::as_str), Some("Builds:  3"));
        assert_eq!(update.get("r0").map(String::as_str), Some("200"));
        assert_eq!(update.get("g1").map(String::as_str), Some("150"));
        assert_eq!(update.get("g2").map(String::as_str), Some("200"));
        assert_eq!(update.get("g3").map(String::as_str), Some("0"));
        Ok(())
    }
}
