//! Arduino firmware for lights with two or more RGB lamps.
//!
//! Color is `~c#RGB;` with each channel 0-15, blink is
//! `~b#[red on][green on][blue on][red off][green off][blue off];` in half
//! seconds. `#` is the lamp number. Every command is answered with the
//! command itself followed by `+` (understood) or `-`.

use crate::{
    encoder::{Capabilities, IndicatorEncoder},
    frame::Frame,
    hex::encode_nibble,
    prelude::*,
    summary::{BuildSetSummary, Health},
};

const PREFIX: u8 = b'~';
const SUFFIX: u8 = b';';
const COLOR: u8 = b'c';
const BLINK: u8 = b'b';

type Rgb = (usize, usize, usize);

const GOOD: Rgb = (0, 13, 8);
const PARTIAL: Rgb = (12, 9, 0);
const BROKEN: Rgb = (13, 0, 0);
const PROBLEM: Rgb = (12, 12, 0);
const DARK: Rgb = (0, 0, 0);

/// Dual RGB encoder.
#[derive(Debug, Clone)]
pub struct DualRgb {
    lamps: usize,
}

impl DualRgb {
    pub fn new(lamps: usize) -> Self {
        Self { lamps }
    }

    /// The 7 byte set color command.
    pub fn color(lamp: usize, (red, green, blue): Rgb) -> Result<Frame> {
        Ok(Frame::Acked(vec![
            PREFIX,
            COLOR,
            encode_nibble(lamp)?,
            encode_nibble(red)?,
            encode_nibble(green)?,
            encode_nibble(blue)?,
            SUFFIX,
        ]))
    }

    /// The 10 byte set blink command. All bulbs in a lamp blink together.
    pub fn blink(lamp: usize, on: usize, off: usize) -> Result<Frame> {
        let on = encode_nibble(on)?;
        let off = encode_nibble(off)?;
        Ok(Frame::Acked(vec![
            PREFIX,
            BLINK,
            encode_nibble(lamp)?,
            on,
            on,
            on,
            off,
            off,
            off,
            SUFFIX,
        ]))
    }
}

impl IndicatorEncoder for DualRgb {
    fn name(&self) -> &'static str {
        "dual_rgb"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            max_lamps: self.lamps,
        }
    }

    fn indicate(&self, lamp: usize, summary: &BuildSetSummary) -> Result<Vec<Frame>> {
        let color = match summary.health() {
            Health::Success => GOOD,
            Health::Partial => PARTIAL,
            Health::Failed => BROKEN,
        };
        let blink = if summary.is_building() {
            DualRgb::blink(lamp, 3, 3)?
        } else {
            DualRgb::blink(lamp, 3, 0)?
        };
        Ok(vec![DualRgb::color(lamp, color)?, blink])
    }

    fn indicate_problem(&self, lamp: usize) -> Result<Vec<Frame>> {
        Ok(vec![
            DualRgb::color(lamp, PROBLEM)?,
            DualRgb::blink(lamp, 1, 1)?,
        ])
    }

    fn all_off(&self) -> Result<Vec<Frame>> {
        let mut frames = Vec::with_capacity(self.lamps * 2);
        for lamp in 0..self.lamps {
            frames.push(DualRgb::color(lamp, DARK)?);
            frames.push(DualRgb::blink(lamp, 2, 0)?);
        }
        Ok(frames)
    }
}
