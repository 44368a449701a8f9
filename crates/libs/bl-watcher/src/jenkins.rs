//! Jenkins (and Hudson) JSON API build source.
//!
//! One request per cycle lists every job with its last two builds; build sets
//! are then matched against that listing with glob patterns.

use bl_config::{bl_build_set::BlBuildSet, bl_config::BlSource};
use bl_requests::{ApiClient, Credentials};
use glob::Pattern;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::{
    build::{BuildOutcome, BuildResultPair, BuildStatus},
    prelude::*,
    source::BuildSource,
};

const JOBS_ENDPOINT: &str = "api/json";
const JOBS_TREE: &str =
    "jobs[name,lastBuild[number,result,building],previousBuild[number,result,building]]";

#[derive(Debug, Deserialize)]
struct JenkinsJobs {
    #[serde(default)]
    jobs: Vec<JenkinsJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JenkinsJob {
    name: String,
    last_build: Option<JenkinsBuild>,
    previous_build: Option<JenkinsBuild>,
}

#[derive(Debug, Deserialize)]
struct JenkinsBuild {
    number: u64,
    result: Option<String>,
    #[serde(default)]
    building: bool,
}

impl From<&JenkinsBuild> for BuildOutcome {
    fn from(build: &JenkinsBuild) -> Self {
        let status = if build.building {
            BuildStatus::InProgress
        } else {
            match build.result.as_deref() {
                Some("SUCCESS") => BuildStatus::Succeeded,
                Some("UNSTABLE") => BuildStatus::PartiallySucceeded,
                Some("FAILURE") => BuildStatus::Failed,
                Some("ABORTED") => BuildStatus::Stopped,
                _ => BuildStatus::NotStarted,
            }
        };
        BuildOutcome::new(build.number, status)
    }
}

fn pattern(set: &BlBuildSet) -> Result<Pattern> {
    let pattern = set.effective_pattern();
    Pattern::new(pattern).map_err(|source| Error::Pattern {
        set: set.name.clone(),
        pattern: pattern.to_string(),
        source,
    })
}

pub struct JenkinsSource {
    client: ApiClient,
    jobs: Option<Vec<JenkinsJob>>,
}

impl JenkinsSource {
    /// Build a source for `source`, checking every build set pattern up front
    /// so a typo fails at startup instead of on every poll.
    pub fn new(source: &BlSource, build_sets: &[BlBuildSet]) -> Result<Self> {
        for set in build_sets {
            pattern(set)?;
        }
        let credentials = source.user.as_ref().map(|user| Credentials {
            user: user.clone(),
            token: source.token.clone(),
        });
        let client =
            ApiClient::new(source.url.clone(), source.timeout)?.with_credentials(credentials);
        Ok(Self { client, jobs: None })
    }
}

impl BuildSource for JenkinsSource {
    async fn connect(&mut self) -> Result<()> {
        // Forget the old listing first so a failed refresh never serves stale jobs.
        self.jobs = None;
        let listing: JenkinsJobs = self
            .client
            .get(JOBS_ENDPOINT, &[("tree", JOBS_TREE)])
            .await?;
        debug!("{} lists {} job(s)", self.client.url(), listing.jobs.len());
        self.jobs = Some(listing.jobs);
        Ok(())
    }

    async fn fetch(&self, set: &BlBuildSet) -> Result<Vec<BuildResultPair>> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| Error::NotConnected(self.client.url().to_string()))?;
        let pattern = pattern(set)?;
        let mut pairs: Vec<BuildResultPair> = jobs
            .iter()
            .filter(|job| pattern.matches(&job.name))
            .filter_map(|job| {
                let Some(last) = &job.last_build else {
                    trace!("{} has never been built", job.name);
                    return None;
                };
                Some(BuildResultPair::new(
                    job.name.clone(),
                    last.into(),
                    job.previous_build.as_ref().map(BuildOutcome::from),
                ))
            })
            .collect();
        pairs.sort_by(|a, b| a.definition().cmp(b.definition()));
        debug!("{} matched {} definition(s)", set.name, pairs.len());
        Ok(pairs)
    }
}
