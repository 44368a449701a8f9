//! Build set definitions.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// A group of build definitions, selected by a name pattern and shown on one lamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlBuildSet {
    /// Display name. Used as the status page header and in logs.
    pub name: String,
    /// Glob pattern matched against build definition names, e.g. `plugins_*`.
    /// An empty pattern selects every definition on the server.
    #[serde(default)]
    pub pattern: String,
}

impl BlBuildSet {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid("build_sets.name", "must not be empty"));
        }
        Ok(())
    }

    /// The pattern to match with, `*` when none was configured.
    pub fn effective_pattern(&self) -> &str {
        if self.pattern.is_empty() {
            "*"
        } else {
            &self.pattern
        }
    }
}
