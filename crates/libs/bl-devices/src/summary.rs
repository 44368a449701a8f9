//! Aggregate build counts, the input to every indicator.

use std::fmt;

use crate::prelude::*;

/// Overall state of a build set, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Every build in the set succeeded.
    Success,
    /// Nothing failed outright but at least one build only partially succeeded.
    Partial,
    /// At least one build failed.
    Failed,
}

/// Counts derived from one poll of a build set.
///
/// `success + partial + failed() == total` always holds; the constructor
/// refuses counts that break it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildSetSummary {
    total: usize,
    success: usize,
    partial: usize,
    building: usize,
}

impl BuildSetSummary {
    pub fn new(total: usize, success: usize, partial: usize, building: usize) -> Result<Self> {
        if success + partial > total || building > total {
            return Err(Error::InconsistentSummary {
                total,
                success,
                partial,
                building,
            });
        }
        Ok(Self {
            total,
            success,
            partial,
            building,
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn success(&self) -> usize {
        self.success
    }

    pub fn partial(&self) -> usize {
        self.partial
    }

    pub fn building(&self) -> usize {
        self.building
    }

    pub fn failed(&self) -> usize {
        self.total - self.success - self.partial
    }

    pub fn is_building(&self) -> bool {
        self.building > 0
    }

    /// Success only when every build succeeded, partial when nothing failed.
    pub fn health(&self) -> Health {
        if self.success == self.total {
            Health::Success
        } else if self.failed() == 0 {
            Health::Partial
        } else {
            Health::Failed
        }
    }

    /// Gauge needle position, 0 when healthy and 100 when nothing succeeded.
    pub fn danger(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (100 - 100 * self.success / self.total) as u8
    }
}

impl fmt::Display for BuildSetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "builds:{} success:{} partial:{} failed:{} building:{}",
            self.total,
            self.success,
            self.partial,
            self.failed(),
            self.building
        )
    }
}
