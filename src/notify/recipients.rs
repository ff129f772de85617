// src/notify/recipients.rs
// Notification recipients and membership diffing

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::NotifyError;
use crate::saved_query::SavedQuerySpecAndConfig;

/// Who a notification goes to. This is the recipient's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientSpec {
    User(i32),
    Org(i32),
}

impl fmt::Display for RecipientSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id),
            Self::Org(id) => write!(f, "org:{}", id),
        }
    }
}

/// A resolved notification target and the channels that apply to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub spec: RecipientSpec,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub chat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_webhook_url: Option<String>,
}

impl Recipient {
    /// Subscribed to chat, or has a webhook a chat message can go to
    pub fn accepts_chat(&self) -> bool {
        self.chat
            || self
                .chat_webhook_url
                .as_deref()
                .is_some_and(|url| !url.trim().is_empty())
    }
}

/// Looks up who is subscribed to a saved query
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    async fn recipients(&self, query: &SavedQuerySpecAndConfig) -> Result<Vec<Recipient>, NotifyError>;
}

/// Resolve recipients, treating an absent query as having none
pub async fn resolve(
    resolver: &dyn RecipientResolver,
    query: Option<&SavedQuerySpecAndConfig>,
) -> Result<Vec<Recipient>, NotifyError> {
    match query {
        Some(query) => resolver.recipients(query).await,
        None => Ok(Vec::new()),
    }
}

/// Split membership changes into `(removed, added)`, comparing by spec.
///
/// Recipients present on both sides are left out. Order follows the input
/// and repeated specs are reported once.
pub fn diff_recipients(old: &[Recipient], new: &[Recipient]) -> (Vec<Recipient>, Vec<Recipient>) {
    let old_specs: HashSet<RecipientSpec> = old.iter().map(|r| r.spec).collect();
    let new_specs: HashSet<RecipientSpec> = new.iter().map(|r| r.spec).collect();

    (
        only_in(old, &new_specs),
        only_in(new, &old_specs),
    )
}

fn only_in(recipients: &[Recipient], other: &HashSet<RecipientSpec>) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    recipients
        .iter()
        .filter(|r| !other.contains(&r.spec) && seen.insert(r.spec))
        .cloned()
        .collect()
}
