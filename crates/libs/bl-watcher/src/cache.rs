//! Latest build results per build set, shared with the status page.

use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::RwLock;

use crate::build::BuildResultPair;

type Results = Arc<[BuildResultPair]>;

/// Replace-on-write store keyed by build set name. Readers get cheap
/// snapshots and never observe a half updated set.
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    sets: Arc<RwLock<BTreeMap<String, Results>>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update(&self, set: &str, pairs: Vec<BuildResultPair>) {
        let pairs: Results = pairs.into();
        self.sets.write().await.insert(set.to_string(), pairs);
    }

    pub async fn snapshot(&self) -> Vec<(String, Results)> {
        self.sets
            .read()
            .await
            .iter()
            .map(|(name, pairs)| (name.clone(), pairs.clone()))
            .collect()
    }
}
