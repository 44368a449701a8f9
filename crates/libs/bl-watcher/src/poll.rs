//! The monitor: poll the build server, show the result, repeat.

use std::time::Duration;

use bl_config::bl_build_set::BlBuildSet;
use bl_devices::DeviceDriver;
use tokio::time::sleep;
use tracing::{Instrument, Span, debug, error, info, warn};

use crate::{cache::StatusCache, prelude::*, source::BuildSource, summarize::summarize};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_BACKOFF: Duration = Duration::from_secs(120);

/// Drives one device from one build source. Build set `n` is shown on lamp `n`.
pub struct PollLoop<S> {
    source: S,
    driver: DeviceDriver,
    build_sets: Vec<BlBuildSet>,
    cache: StatusCache,
    interval: Duration,
    backoff: Duration,
    span: Span,
}

impl<S: BuildSource> PollLoop<S> {
    pub fn new(source: S, driver: DeviceDriver, build_sets: Vec<BlBuildSet>) -> Self {
        Self {
            source,
            driver,
            build_sets,
            cache: StatusCache::new(),
            interval: DEFAULT_INTERVAL,
            backoff: DEFAULT_BACKOFF,
            span: Span::none(),
        }
    }

    /// Pause between cycles, and the longer pause after a failed one.
    pub fn with_timing(mut self, interval: Duration, backoff: Duration) -> Self {
        self.interval = interval;
        self.backoff = backoff;
        self
    }

    /// Publish every cycle's results to `cache`.
    pub fn with_cache(mut self, cache: StatusCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn cache(&self) -> StatusCache {
        self.cache.clone()
    }

    /// Poll forever. Only errors that retrying cannot fix end the loop.
    pub async fn run(&mut self) -> Result<()> {
        let span = self.span.clone();
        async move {
            info!(
                "Watching {} build set(s) on a {} device every {:?}",
                self.build_sets.len(),
                self.driver.name(),
                self.interval
            );
            loop {
                let pause = self.cycle().await?;
                debug!("Next poll in {pause:?}");
                sleep(pause).await;
            }
        }
        .instrument(span)
        .await
    }

    /// One sweep over every build set. Returns how long to wait before the
    /// next one: the poll interval, or the back-off after a transient failure
    /// that has been shown as a problem on every lamp.
    pub async fn cycle(&mut self) -> Result<Duration> {
        match self.sweep().await {
            Ok(()) => Ok(self.interval),
            Err(err) if err.is_transient() => {
                error!("Build status unavailable, backing off for {:?} - {err}", self.backoff);
                self.indicate_problem_everywhere().await;
                Ok(self.backoff)
            }
            Err(err) => Err(err),
        }
    }

    /// Cancel the pending bell and turn every lamp off.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.driver.shutdown().instrument(self.span.clone()).await?;
        Ok(())
    }

    async fn sweep(&mut self) -> Result<()> {
        self.source.connect().await?;
        for (lamp, set) in self.build_sets.iter().enumerate() {
            let pairs = self.source.fetch(set).await?;
            let summary = if pairs.is_empty() {
                None
            } else {
                Some(summarize(&pairs)?)
            };
            // Cached before the device is driven.
            self.cache.update(&set.name, pairs).await;
            match summary {
                Some(summary) => {
                    info!("{} {summary}", set.name);
                    self.driver.indicate(lamp, &summary).await?;
                }
                None => {
                    warn!("Build set {} matches no build definitions", set.name);
                    self.driver.indicate_problem(lamp).await?;
                }
            }
        }
        Ok(())
    }

    async fn indicate_problem_everywhere(&mut self) {
        for lamp in 0..self.build_sets.len() {
            if let Err(err) = self.driver.indicate_problem(lamp).await {
                warn!("Failed to show problem on lamp {lamp} - {err}");
            }
        }
    }
}
