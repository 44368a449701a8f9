//! Build outcomes as reported by the build server.

use std::fmt;

use serde::Serialize;

/// Outcome of a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildStatus {
    Succeeded,
    PartiallySucceeded,
    Failed,
    Stopped,
    NotStarted,
    InProgress,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BuildStatus::Succeeded => "Succeeded",
            BuildStatus::PartiallySucceeded => "PartiallySucceeded",
            BuildStatus::Failed => "Failed",
            BuildStatus::Stopped => "Stopped",
            BuildStatus::NotStarted => "NotStarted",
            BuildStatus::InProgress => "InProgress",
        };
        f.write_str(text)
    }
}

/// Build number as assigned by the build server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BuildId(pub u64);

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    pub id: BuildId,
    pub status: BuildStatus,
}

impl BuildOutcome {
    pub fn new(id: u64, status: BuildStatus) -> Self {
        Self {
            id: BuildId(id),
            status,
        }
    }
}

/// The two most recent builds of one build definition.
///
/// The previous build stands in for the last one while the last one is still
/// running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResultPair {
    definition: String,
    last: BuildOutcome,
    previous: Option<BuildOutcome>,
}

impl BuildResultPair {
    pub fn new(
        definition: impl Into<String>,
        last: BuildOutcome,
        previous: Option<BuildOutcome>,
    ) -> Self {
        Self {
            definition: definition.into(),
            last,
            previous,
        }
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn last(&self) -> &BuildOutcome {
        &self.last
    }

    pub fn previous(&self) -> Option<&BuildOutcome> {
        self.previous.as_ref()
    }

    pub fn is_building(&self) -> bool {
        self.last.status == BuildStatus::InProgress
    }

    /// Status the lights should show: the last finished build.
    ///
    /// `None` while the first build ever is still running.
    pub fn settled_status(&self) -> Option<BuildStatus> {
        if self.is_building() {
            self.previous.map(|previous| previous.status)
        } else {
            Some(self.last.status)
        }
    }
}
