//! Reduces the build results of one build set to the counts a device shows.

use bl_devices::BuildSetSummary;

use crate::{
    build::{BuildResultPair, BuildStatus},
    prelude::*,
};

/// Count the settled outcomes of a build set.
///
/// A running build counts as whatever its previous build was. The first
/// build of a definition has nothing to fall back on and counts as failed
/// until it finishes.
pub fn summarize(pairs: &[BuildResultPair]) -> Result<BuildSetSummary> {
    let count = |status: BuildStatus| {
        pairs
            .iter()
            .filter(|pair| pair.settled_status() == Some(status))
            .count()
    };
    let building = pairs.iter().filter(|pair| pair.is_building()).count();
    BuildSetSummary::new(
        pairs.len(),
        count(BuildStatus::Succeeded),
        count(BuildStatus::PartiallySucceeded),
        building,
    )
    .map_err(Error::from)
}
