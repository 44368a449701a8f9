//! Single RGB led on an MSP430 launchpad: `rgb <r> <g> <b> <pattern>`.

use crate::{
    encoder::{Capabilities, IndicatorEncoder},
    frame::Frame,
    prelude::*,
    summary::{BuildSetSummary, Health},
};

#[derive(Debug, Clone)]
pub struct Launchpad {
    failure_pattern: u8,
    partial_pattern: u8,
}

impl Launchpad {
    pub fn new(failure_pattern: u8, partial_pattern: u8) -> Self {
        Self {
            failure_pattern,
            partial_pattern,
        }
    }
}

fn rgb(red: u8, green: u8, blue: u8, pattern: u8) -> Frame {
    Frame::line(format!("rgb {red} {green} {blue} {pattern}"))
}

impl IndicatorEncoder for Launchpad {
    fn name(&self) -> &'static str {
        "launchpad"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { max_lamps: 1 }
    }

    fn indicate(&self, _lamp: usize, summary: &BuildSetSummary) -> Result<Vec<Frame>> {
        let frame = match summary.health() {
            Health::Success => rgb(0, 250, 0, 1),
            Health::Partial => rgb(200, 100, 0, self.partial_pattern),
            Health::Failed => rgb(250, 0, 0, self.failure_pattern),
        };
        Ok(vec![frame])
    }

    fn indicate_problem(&self, _lamp: usize) -> Result<Vec<Frame>> {
        Ok(vec![rgb(128, 128, 0, 9)])
    }

    fn all_off(&self) -> Result<Vec<Frame>> {
        Ok(vec![rgb(0, 0, 0, 0)])
    }
}
