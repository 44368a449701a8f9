//! Analog gauge built into an alarm clock: a servo needle, a two color led
//! and a bell. Only lamp 0 exists.

use std::time::Duration;

use crate::{
    encoder::{Capabilities, IndicatorEncoder},
    frame::Frame,
    prelude::*,
    summary::{BuildSetSummary, Health},
};

/// Bell pattern used to flag a build server problem.
const PROBLEM_PATTERN: u8 = 9;

#[derive(Debug, Clone)]
pub struct Gauge {
    failure_pattern: u8,
    partial_pattern: u8,
    bell: Duration,
}

impl Gauge {
    /// Patterns of 0 keep the bell quiet for that state, as does a zero
    /// `bell` duration.
    pub fn new(failure_pattern: u8, partial_pattern: u8, bell: Duration) -> Self {
        Self {
            failure_pattern,
            partial_pattern,
            bell,
        }
    }

    fn bell_pattern(&self, summary: &BuildSetSummary) -> u8 {
        if self.bell.is_zero() {
            0
        } else if summary.failed() > 0 && self.failure_pattern > 0 {
            self.failure_pattern
        } else if summary.partial() > 0 && self.partial_pattern > 0 {
            self.partial_pattern
        } else {
            0
        }
    }
}

fn ring(pattern: u8) -> Frame {
    Frame::line(format!("bell ring {pattern}"))
}

impl IndicatorEncoder for Gauge {
    fn name(&self) -> &'static str {
        "gauge"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { max_lamps: 1 }
    }

    fn indicate(&self, _lamp: usize, summary: &BuildSetSummary) -> Result<Vec<Frame>> {
        let mut frames = vec![Frame::line(format!("servo set {}", summary.danger()))];
        frames.push(match summary.health() {
            Health::Success => Frame::line("led green 1"),
            Health::Partial | Health::Failed => Frame::line("led red 1"),
        });
        match self.bell_pattern(summary) {
            0 => frames.push(ring(0)),
            pattern => {
                frames.push(ring(pattern));
                frames.push(Frame::Delayed {
                    after: self.bell,
                    frame: Box::new(ring(0)),
                });
            }
        }
        Ok(frames)
    }

    fn indicate_problem(&self, _lamp: usize) -> Result<Vec<Frame>> {
        Ok(vec![ring(PROBLEM_PATTERN), Frame::line("led red 1")])
    }

    fn all_off(&self) -> Result<Vec<Frame>> {
        Ok(vec![
            Frame::line("servo set 0"),
            Frame::line("led off"),
            ring(0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge() -> Gauge {
        Gauge::new(5, 2, Duration::from_millis(3000))
    }

    fn lines(frames: &[Frame]) -> Vec<String> {
        frames.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn all_green_is_quiet() -> Result<()> {
        let frames = gauge().indicate(0, &BuildSetSummary::new(5, 5, 0, 0)?)?;
        assert_eq!(
            lines(&frames),
            vec!["servo set 0", "led green 1", "bell ring 0"]
        );
        Ok(())
    }

    #[test]
    fn failures_ring_and_schedule_silence() -> Result<()> {
        let frames = gauge().indicate(0, &BuildSetSummary::new(4, 0, 0, 0)?)?;
        assert_eq!(frames[0], Frame::line("servo set 100"));
        assert_eq!(frames[1], Frame::line("led red 1"));
        assert_eq!(frames[2], Frame::line("bell ring 5"));
        assert_eq!(
            frames[3],
            Frame::Delayed {
                after: Duration::from_millis(3000),
                frame: Box::new(Frame::line("bell ring 0")),
            }
        );
        Ok(())
    }

    #[test]
    fn partial_rings_its_own_pattern() -> Result<()> {
        let frames = gauge().indicate(0, &BuildSetSummary::new(4, 3, 1, 0)?)?;
        assert_eq!(frames[0], Frame::line("servo set 25"));
        assert_eq!(frames[2], Frame::line("bell ring 2"));
        Ok(())
    }

    #[test]
    fn disabled_patterns_do_not_ring() -> Result<()> {
        let quiet = Gauge::new(0, 0, Duration::from_millis(3000));
        let frames = quiet.indicate(0, &BuildSetSummary::new(4, 1, 1, 0)?)?;
        assert_eq!(frames.last(), Some(&Frame::line("bell ring 0")));
        assert_eq!(frames.len(), 3);

        let no_time = Gauge::new(5, 2, Duration::ZERO);
        let frames = no_time.indicate(0, &BuildSetSummary::new(4, 1, 1, 0)?)?;
        assert_eq!(frames.len(), 3);
        Ok(())
    }

    #[test]
    fn empty_set_parks_the_needle() -> Result<()> {
        let frames = gauge().indicate(0, &BuildSetSummary::default())?;
        assert_eq!(frames[0], Frame::line("servo set 0"));
        Ok(())
    }

    #[test]
    fn problem_rings_nine() -> Result<()> {
        let frames = gauge().indicate_problem(0)?;
        assert_eq!(lines(&frames), vec!["bell ring 9", "led red 1"]);
        Ok(())
    }
}
