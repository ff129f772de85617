// src/saved_query/diff.rs
// Set difference between two saved query snapshots

use super::types::{SavedQuerySpecAndConfig, Snapshot};

/// One changed saved query. `None` stands for "not configured".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedQueryChange {
    pub old: Option<SavedQuerySpecAndConfig>,
    pub new: Option<SavedQuerySpecAndConfig>,
}

impl SavedQueryChange {
    pub fn created(new: SavedQuerySpecAndConfig) -> Self {
        Self {
            old: None,
            new: Some(new),
        }
    }

    pub fn deleted(old: SavedQuerySpecAndConfig) -> Self {
        Self {
            old: Some(old),
            new: None,
        }
    }

    pub fn updated(old: SavedQuerySpecAndConfig, new: SavedQuerySpecAndConfig) -> Self {
        Self {
            old: Some(old),
            new: Some(new),
        }
    }

    /// Query text for log context, preferring the old value
    pub fn query(&self) -> &str {
        self.old
            .as_ref()
            .or(self.new.as_ref())
            .map(|q| q.config.query.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedQueryDiff {
    pub deleted: Vec<SavedQueryChange>,
    pub created: Vec<SavedQueryChange>,
    pub updated: Vec<SavedQueryChange>,
}

impl SavedQueryDiff {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.created.is_empty() && self.updated.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deleted.len() + self.created.len() + self.updated.len()
    }

    /// All changes: deleted, then created, then updated
    pub fn changes(&self) -> impl Iterator<Item = &SavedQueryChange> {
        self.deleted
            .iter()
            .chain(self.created.iter())
            .chain(self.updated.iter())
    }

    pub fn into_changes(self) -> impl Iterator<Item = SavedQueryChange> {
        self.deleted
            .into_iter()
            .chain(self.created)
            .chain(self.updated)
    }
}

/// Compare two snapshots keyed by identity.
///
/// Identities only in `old` are deleted, identities only in `new` are
/// created, and identities in both are updated when their configs differ.
/// Output is ordered by cache key.
pub fn diff_saved_queries(old: &Snapshot, new: &Snapshot) -> SavedQueryDiff {
    let mut diff = SavedQueryDiff::default();

    for (key, old_value) in old {
        if !new.contains_key(key) {
            diff.deleted.push(SavedQueryChange::deleted(old_value.clone()));
        }
    }

    for (key, new_value) in new {
        match old.get(key) {
            None => diff.created.push(SavedQueryChange::created(new_value.clone())),
            Some(old_value) if old_value.config != new_value.config => {
                diff.updated
                    .push(SavedQueryChange::updated(old_value.clone(), new_value.clone()));
            }
            Some(_) => {}
        }
    }

    diff
}

/// Fold the `(prior, new)` pairs of one batch into before and after
/// snapshots.
///
/// An identity repeated within the batch keeps the prior it had before the
/// batch started and the last value written to it.
pub fn batch_snapshots<I>(pairs: I) -> (Snapshot, Snapshot)
where
    I: IntoIterator<Item = (Option<SavedQuerySpecAndConfig>, SavedQuerySpecAndConfig)>,
{
    let mut before = Snapshot::new();
    let mut after = Snapshot::new();
    for (prior, value) in pairs {
        let key = value.cache_key();
        if !after.contains_key(&key) {
            if let Some(prior) = prior {
                before.insert(key.clone(), prior);
            }
        }
        after.insert(key, value);
    }
    (before, after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved_query::types::{snapshot_from, SavedQueryConfig, SavedQueryIdSpec, Subject};

    fn query(subject: Subject, key: &str, text: &str) -> SavedQuerySpecAndConfig {
        SavedQuerySpecAndConfig::new(
            SavedQueryIdSpec::new(subject, key),
            SavedQueryConfig {
                key: key.to_string(),
                query: text.to_string(),
                description: format!("{} search", key),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_self_diff_is_empty() {
        let snapshot = snapshot_from(vec![
            query(Subject::User(1), "a", "error"),
            query(Subject::Org(2), "b", "panic"),
        ]);
        let diff = diff_saved_queries(&snapshot, &snapshot);
        assert!(diff.is_empty());
        assert_eq!(diff.len(), 0);
    }

    #[test]
    fn test_removed_entry_is_deleted() {
        let a = query(Subject::User(1), "a", "error");
        let old = snapshot_from(vec![a.clone()]);
        let diff = diff_saved_queries(&old, &Snapshot::new());

        assert_eq!(diff.deleted, vec![SavedQueryChange::deleted(a)]);
        assert!(diff.created.is_empty());
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn test_new_entry_is_created() {
        let a = query(Subject::User(1), "a", "error");
        let new = snapshot_from(vec![a.clone()]);
        let diff = diff_saved_queries(&Snapshot::new(), &new);

        assert_eq!(diff.created, vec![SavedQueryChange::created(a)]);
        assert!(diff.deleted.is_empty());
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn test_changed_config_is_updated() {
        let before = query(Subject::User(1), "a", "error");
        let mut after = before.clone();
        after.config.notify = true;

        let diff = diff_saved_queries(
            &snapshot_from(vec![before.clone()]),
            &snapshot_from(vec![after.clone()]),
        );

        assert_eq!(diff.updated, vec![SavedQueryChange::updated(before, after)]);
        assert!(diff.created.is_empty());
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn test_same_key_different_subjects_are_distinct() {
        let user = query(Subject::User(1), "shared", "x");
        let org = query(Subject::Org(1), "shared", "x");
        let diff = diff_saved_queries(
            &snapshot_from(vec![user.clone()]),
            &snapshot_from(vec![org.clone()]),
        );

        assert_eq!(diff.deleted, vec![SavedQueryChange::deleted(user)]);
        assert_eq!(diff.created, vec![SavedQueryChange::created(org)]);
    }

    #[test]
    fn test_multiple_creates_are_all_reported() {
        let new = snapshot_from(vec![
            query(Subject::User(1), "a", "one"),
            query(Subject::User(1), "b", "two"),
            query(Subject::User(1), "c", "three"),
        ]);
        let diff = diff_saved_queries(&Snapshot::new(), &new);
        assert_eq!(diff.created.len(), 3);
        assert!(diff.created.iter().all(|c| c.old.is_none()));
    }

    #[test]
    fn test_changes_order() {
        let kept = query(Subject::User(1), "kept", "k");
        let mut kept_changed = kept.clone();
        kept_changed.config.description = "renamed".to_string();
        let gone = query(Subject::User(1), "gone", "g");
        let fresh = query(Subject::User(1), "fresh", "f");

        let diff = diff_saved_queries(
            &snapshot_from(vec![kept, gone]),
            &snapshot_from(vec![kept_changed, fresh]),
        );

        let queries: Vec<&str> = diff.changes().map(|c| c.query()).collect();
        assert_eq!(queries, vec!["g", "f", "k"]);
    }

    #[test]
    fn test_repeated_identity_in_batch_is_created() {
        let first = query(Subject::User(1), "a", "one");
        let second = query(Subject::User(1), "a", "two");
        let (before, after) = batch_snapshots(vec![
            (None, first.clone()),
            (Some(first), second.clone()),
        ]);

        assert!(before.is_empty());
        let diff = diff_saved_queries(&before, &after);
        assert!(diff.updated.is_empty());
        assert_eq!(diff.created, vec![SavedQueryChange::created(second)]);
    }

    #[test]
    fn test_batch_keeps_prior_from_before_batch() {
        let cached = query(Subject::Org(2), "b", "cached");
        let mid = query(Subject::Org(2), "b", "mid");
        let last = query(Subject::Org(2), "b", "cached");
        let (before, after) = batch_snapshots(vec![
            (Some(cached.clone()), mid.clone()),
            (Some(mid), last),
        ]);

        assert_eq!(before.values().next(), Some(&cached));
        // Net effect of the batch is no change
        assert!(diff_saved_queries(&before, &after).is_empty());
    }
}
