// src/saved_query/mod.rs
// Saved query model, cache, and snapshot diffing

pub mod cache;
pub mod diff;
pub mod types;

pub use cache::{Removal, SavedQueryCache, DEFAULT_RETRY_DELAY};
pub use diff::{batch_snapshots, diff_saved_queries, SavedQueryChange, SavedQueryDiff};
pub use types::{
    snapshot_from, ConfigSubjectAndConfig, SavedQueriesSettings, SavedQueryConfig,
    SavedQueryIdSpec, SavedQuerySpecAndConfig, Snapshot, Subject,
};
