//! Build server monitoring for build lights.
//!
//! A [`PollLoop`] asks a [`BuildSource`] for the last two builds of every
//! definition in each configured build set, reduces them to a
//! [`BuildSetSummary`](bl_devices::BuildSetSummary) and hands that to the
//! device driver. Results are also published to a [`StatusCache`] for the
//! status page.

pub mod build;
pub mod cache;
pub mod error;
pub mod jenkins;
pub mod poll;
pub mod prelude;
pub mod source;
pub mod summarize;

pub use cache::StatusCache;
pub use jenkins::JenkinsSource;
pub use poll::PollLoop;
pub use source::BuildSource;
