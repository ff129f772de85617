// src/saved_query/types.rs
// Saved query identity and configuration payloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Owner of a saved query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    User(i32),
    Org(i32),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id),
            Self::Org(id) => write!(f, "org:{}", id),
        }
    }
}

/// Identity of a saved query: owner plus the key within the owner's settings.
///
/// The identity never changes across updates; only the config does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SavedQueryIdSpec {
    pub subject: Subject,
    pub key: String,
}

impl SavedQueryIdSpec {
    pub fn new(subject: Subject, key: impl Into<String>) -> Self {
        Self {
            subject,
            key: key.into(),
        }
    }

    /// Stable string key used by the cache map
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.subject, self.key)
    }
}

impl fmt::Display for SavedQueryIdSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// One saved query as configured in a user's or org's settings.
///
/// Equality covers exactly these fields; two configs that compare equal
/// never produce an "updated" change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQueryConfig {
    pub key: String,
    #[serde(default)]
    pub description: String,
    pub query: String,
    #[serde(default)]
    pub show_on_homepage: bool,
    /// Email subscribers when results change
    #[serde(default)]
    pub notify: bool,
    /// Post to the owner's chat webhook when results change
    #[serde(default)]
    pub notify_slack: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedQuerySpecAndConfig {
    pub spec: SavedQueryIdSpec,
    pub config: SavedQueryConfig,
}

impl SavedQuerySpecAndConfig {
    pub fn new(spec: SavedQueryIdSpec, config: SavedQueryConfig) -> Self {
        Self { spec, config }
    }

    pub fn cache_key(&self) -> String {
        self.spec.cache_key()
    }
}

/// All saved queries configured by one subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQueriesSettings {
    #[serde(default)]
    pub saved_queries: Vec<SavedQueryConfig>,
}

/// Inbound payload pairing a subject with its full saved query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSubjectAndConfig {
    pub subject: Subject,
    pub config: SavedQueriesSettings,
}

impl ConfigSubjectAndConfig {
    /// Expand into one spec-and-config per saved query, in payload order
    pub fn entries(&self) -> Vec<SavedQuerySpecAndConfig> {
        self.config
            .saved_queries
            .iter()
            .map(|query| {
                SavedQuerySpecAndConfig::new(
                    SavedQueryIdSpec::new(self.subject, query.key.clone()),
                    query.clone(),
                )
            })
            .collect()
    }
}

/// Point-in-time copy of the cache, keyed by `SavedQueryIdSpec::cache_key`
pub type Snapshot = BTreeMap<String, SavedQuerySpecAndConfig>;

/// Build a snapshot from a list of saved queries; later entries win.
pub fn snapshot_from<I>(queries: I) -> Snapshot
where
    I: IntoIterator<Item = SavedQuerySpecAndConfig>,
{
    queries
        .into_iter()
        .map(|query| (query.cache_key(), query))
        .collect()
}
