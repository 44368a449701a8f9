//! A device that only logs what it would show.

use crate::{
    encoder::{Capabilities, IndicatorEncoder},
    frame::Frame,
    prelude::*,
    summary::BuildSetSummary,
};

#[derive(Debug, Clone, Default)]
pub struct Simulated;

impl IndicatorEncoder for Simulated {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            max_lamps: usize::MAX,
        }
    }

    fn indicate(&self, lamp: usize, summary: &BuildSetSummary) -> Result<Vec<Frame>> {
        Ok(vec![Frame::Note(format!(
            "Indicate lamp {lamp}: {summary} health:{:?}",
            summary.health()
        ))])
    }

    fn indicate_problem(&self, lamp: usize) -> Result<Vec<Frame>> {
        Ok(vec![Frame::Note(format!("Indicate problem on lamp {lamp}"))])
    }

    fn all_off(&self) -> Result<Vec<Frame>> {
        Ok(vec![Frame::Note(String::from("All lamps off"))])
    }
}
