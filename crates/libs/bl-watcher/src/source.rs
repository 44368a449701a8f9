//! Where build results come from.

use std::future::Future;

use bl_config::bl_build_set::BlBuildSet;

use crate::{build::BuildResultPair, prelude::*};

pub trait BuildSource: Send {
    /// Make sure the build server can be reached, reconnecting when the
    /// previous cycle lost it. Called once at the start of every cycle.
    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Last and previous build of every definition matching `set`, sorted by
    /// definition name.
    fn fetch(&self, set: &BlBuildSet) -> impl Future<Output = Result<Vec<BuildResultPair>>> + Send;
}
