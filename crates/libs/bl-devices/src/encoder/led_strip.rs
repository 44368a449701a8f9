//! LED strip behind an Arduino web server.
//!
//! Every update is one url encoded POST carrying six lines of status text
//! (`s0`..`s5`) and an `r#`, `g#`, `b#` triple per lamp.

use crate::{
    encoder::{Capabilities, IndicatorEncoder},
    frame::Frame,
    prelude::*,
    summary::BuildSetSummary,
};

const MAX_BRIGHT: &str = "200";
const MIX_BRIGHT: &str = "150";
const NO_BRIGHT: &str = "0";
const BLANK_LINE: &str = "            ";

type Fields = Vec<(String, String)>;

#[derive(Debug, Clone)]
pub struct LedStrip {
    lamps: usize,
}

impl LedStrip {
    pub fn new(lamps: usize) -> Self {
        Self { lamps }
    }

    /// Status lines plus one color triple for each of the first
    /// `min(lamps, total)` lamps: failures red, partials yellow, the rest
    /// green.
    pub fn post_data_set(&self, total: usize, success: usize, partial: usize) -> Fields {
        let failed = total.saturating_sub(success + partial);
        let mut fields = vec![
            field("s0", format!("Builds:  {total}")),
            field("s1", format!("Success: {success}")),
            field("s2", format!("Partial: {partial}")),
            field("s3", format!("Failed:  {failed}")),
            field("s4", BLANK_LINE),
            field("s5", BLANK_LINE),
        ];
        for lamp in 0..self.lamps.min(total) {
            let (red, green) = if lamp < failed {
                (MAX_BRIGHT, NO_BRIGHT)
            } else if lamp < failed + partial {
                (MIX_BRIGHT, MIX_BRIGHT)
            } else {
                (NO_BRIGHT, MAX_BRIGHT)
            };
            push_lamp(&mut fields, lamp, red, green, NO_BRIGHT);
        }
        fields
    }

    fn dark_from(&self, first: usize, fields: &mut Fields) {
        for lamp in first..self.lamps {
            push_lamp(fields, lamp, NO_BRIGHT, NO_BRIGHT, NO_BRIGHT);
        }
    }
}

fn field(name: &str, value: impl Into<String>) -> (String, String) {
    (name.to_string(), value.into())
}

fn push_lamp(fields: &mut Fields, lamp: usize, red: &str, green: &str, blue: &str) {
    fields.push((format!("r{lamp}"), red.to_string()));
    fields.push((format!("g{lamp}"), green.to_string()));
    fields.push((format!("b{lamp}"), blue.to_string()));
}

impl IndicatorEncoder for LedStrip {
    fn name(&self) -> &'static str {
        "led_strip"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            max_lamps: self.lamps,
        }
    }

    /// Lamps past the end of the build set are turned dark so a shrinking
    /// set does not leave stale colors behind.
    fn indicate(&self, _lamp: usize, summary: &BuildSetSummary) -> Result<Vec<Frame>> {
        let mut fields = self.post_data_set(summary.total(), summary.success(), summary.partial());
        self.dark_from(summary.total(), &mut fields);
        Ok(vec![Frame::Form(fields)])
    }

    fn indicate_problem(&self, _lamp: usize) -> Result<Vec<Frame>> {
        Ok(vec![Frame::Form(self.post_data_set(self.lamps, 0, 0))])
    }

    fn all_off(&self) -> Result<Vec<Frame>> {
        let mut fields = self.post_data_set(0, 0, 0);
        self.dark_from(0, &mut fields);
        Ok(vec![Frame::Form(fields)])
    }
}
