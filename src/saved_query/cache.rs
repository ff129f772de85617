// src/saved_query/cache.rs
// In-memory cache of every saved query configured on the instance

use std::collections::HashMap;
use std::ops::DerefMut;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::types::{
    ConfigSubjectAndConfig, SavedQueryConfig, SavedQueryIdSpec, SavedQuerySpecAndConfig, Snapshot,
};
use crate::frontend::SavedQuerySource;

/// Delay between bulk load attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Failures tolerated silently while the frontend is still starting up
const QUIET_ATTEMPTS: u32 = 3;

/// Whether a failed load is logged, given how many attempts failed before it
fn failure_is_logged(prior_failures: u32) -> bool {
    prior_failures > QUIET_ATTEMPTS
}

/// Result of removing a saved query from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub removed: SavedQuerySpecAndConfig,
    /// Another surviving saved query has the same query text
    pub query_still_referenced: bool,
}

/// Cache of all saved queries, keyed by `SavedQueryIdSpec::cache_key`.
///
/// Loaded once from the frontend at startup, then kept current by the
/// create/update/delete callbacks. Nothing is persisted.
#[derive(Debug)]
pub struct SavedQueryCache {
    entries: Arc<Mutex<HashMap<String, SavedQuerySpecAndConfig>>>,
    ready: AtomicBool,
    retry_delay: Duration,
}

impl Default for SavedQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SavedQueryCache {
    pub fn new() -> Self {
        Self::with_retry_delay(DEFAULT_RETRY_DELAY)
    }

    pub fn with_retry_delay(retry_delay: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ready: AtomicBool::new(false),
            retry_delay,
        }
    }

    /// Build an already-loaded cache (used when the initial list is known)
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            entries: Arc::new(Mutex::new(snapshot.into_iter().collect())),
            ready: AtomicBool::new(true),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Block until the full list of saved queries has been fetched.
    ///
    /// The lock is held for the whole load so callbacks that arrive during
    /// startup wait for the initial list instead of racing it. There is no
    /// attempt limit.
    pub async fn bulk_load(&self, source: &dyn SavedQuerySource) -> usize {
        let entries = self.entries.lock().await;
        self.load_into(entries, source).await
    }

    /// Run `bulk_load` on a background task.
    ///
    /// The lock is taken before this returns, so a server started afterwards
    /// cannot apply a callback that the initial list would then overwrite.
    pub fn spawn_bulk_load(self: &Arc<Self>, source: Arc<dyn SavedQuerySource>) -> JoinHandle<usize> {
        let held = Arc::clone(&self.entries).try_lock_owned().ok();
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let entries = match held {
                Some(entries) => entries,
                None => Arc::clone(&cache.entries).lock_owned().await,
            };
            cache.load_into(entries, source.as_ref()).await
        })
    }

    async fn load_into<G>(&self, mut entries: G, source: &dyn SavedQuerySource) -> usize
    where
        G: DerefMut<Target = HashMap<String, SavedQuerySpecAndConfig>>,
    {
        let mut attempts: u32 = 0;
        loop {
            match source.list_all().await {
                Ok(queries) => {
                    *entries = queries
                        .into_iter()
                        .map(|query| (query.cache_key(), query))
                        .collect();
                    self.ready.store(true, Ordering::Release);
                    debug!(
                        total_saved_queries = entries.len(),
                        attempts = attempts + 1,
                        "existing saved queries detected"
                    );
                    return entries.len();
                }
                Err(e) => {
                    if failure_is_logged(attempts) {
                        error!(
                            error = %e,
                            retry_in_secs = self.retry_delay.as_secs_f64(),
                            "error fetching saved queries list"
                        );
                    }
                    tokio::time::sleep(self.retry_delay).await;
                    attempts += 1;
                }
            }
        }
    }

    /// Whether the initial bulk load has completed
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Independent copy of the current mapping
    pub async fn snapshot(&self) -> Snapshot {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub async fn get(&self, spec: &SavedQueryIdSpec) -> Option<SavedQuerySpecAndConfig> {
        self.entries.lock().await.get(&spec.cache_key()).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert or replace one saved query, returning the prior value
    pub async fn apply_create_or_update(
        &self,
        spec: SavedQueryIdSpec,
        config: SavedQueryConfig,
    ) -> Option<SavedQuerySpecAndConfig> {
        let value = SavedQuerySpecAndConfig::new(spec, config);
        self.entries.lock().await.insert(value.cache_key(), value)
    }

    /// Apply every saved query of one subject under a single lock
    /// acquisition. Returns `(prior, new)` for each query in payload order.
    pub async fn apply_subject_config(
        &self,
        payload: &ConfigSubjectAndConfig,
    ) -> Vec<(Option<SavedQuerySpecAndConfig>, SavedQuerySpecAndConfig)> {
        let mut entries = self.entries.lock().await;
        payload
            .entries()
            .into_iter()
            .map(|value| {
                let prior = entries.insert(value.cache_key(), value.clone());
                (prior, value)
            })
            .collect()
    }

    /// Remove a saved query. Absent identities are a no-op.
    pub async fn apply_delete(&self, spec: &SavedQueryIdSpec) -> Option<Removal> {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(&spec.cache_key())?;

        // Side tables in the store are keyed by query text, so the text is
        // only released once no other saved query uses it.
        let query_still_referenced = entries
            .values()
            .any(|other| other.config.query == removed.config.query);

        Some(Removal {
            removed,
            query_still_referenced,
        })
    }
}
