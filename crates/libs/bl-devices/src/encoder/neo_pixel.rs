//! NeoPixel shield driven over serial, one pixel per build instead of one
//! lamp per build set.
//!
//! Firmware commands are `blank` and `rgb <index> <r> <g> <b> <pattern>`,
//! index -1 addressing every pixel.

use crate::{
    encoder::{Capabilities, IndicatorEncoder},
    frame::Frame,
    prelude::*,
    summary::BuildSetSummary,
};

const STEADY: u8 = 1;

#[derive(Debug, Clone)]
pub struct NeoPixel {
    lamps: usize,
    building_pattern: u8,
}

impl NeoPixel {
    pub fn new(lamps: usize, building_pattern: u8) -> Self {
        Self {
            lamps,
            building_pattern,
        }
    }
}

impl IndicatorEncoder for NeoPixel {
    fn name(&self) -> &'static str {
        "neo_pixel"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            max_lamps: self.lamps,
        }
    }

    /// Pixels are painted from the highest index down. Failures come first,
    /// then partial, then successful builds; the top `building` lit pixels
    /// blink.
    fn indicate(&self, _lamp: usize, summary: &BuildSetSummary) -> Result<Vec<Frame>> {
        let failed = summary.failed();
        let not_successful = summary.total() - summary.success();
        let lit = self.lamps.min(summary.total());
        let blinking_from = lit.saturating_sub(summary.building());

        let mut frames = Vec::with_capacity(self.lamps + 1);
        frames.push(Frame::line("blank"));
        for pixel in (0..self.lamps).rev() {
            let pattern = if pixel >= blinking_from {
                self.building_pattern
            } else {
                STEADY
            };
            let frame = if pixel < failed {
                format!("rgb {pixel} 25 0 0 {pattern}")
            } else if pixel < not_successful {
                format!("rgb {pixel} 20 20 0 {pattern}")
            } else if pixel < summary.total() {
                format!("rgb {pixel} 0 10 0 {pattern}")
            } else {
                format!("rgb {pixel} 0 0 0 0")
            };
            frames.push(Frame::line(frame));
        }
        Ok(frames)
    }

    fn indicate_problem(&self, _lamp: usize) -> Result<Vec<Frame>> {
        Ok(vec![Frame::line("rgb -1 10 10 0 9")])
    }

    fn all_off(&self) -> Result<Vec<Frame>> {
        Ok(vec![Frame::line("blank")])
    }
}
