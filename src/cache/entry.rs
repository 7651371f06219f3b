//! The per-user uniqueness cache.
//!
//! Each entry records when it was last written and the set of fragment texts
//! already delivered to that user. Entries are created lazily on first touch,
//! reset explicitly by an admin command, grown by deliveries, and never
//! deleted within a run.
//!
//! # Invariants
//!
//! - `delivered` is monotonically non-decreasing between explicit resets.
//! - `last_mutation` reflects the most recent write to the entry (creation,
//!   delivery, or reset), not the time of the triggering message.
//!
//! The cache is only ever mutated by the controlling process; worker tasks
//! receive an immutable snapshot of the delivered sets.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// One user's delivery record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When this entry was last written.
    pub last_mutation: DateTime<Utc>,

    /// Fragment texts already delivered to this user.
    pub delivered: BTreeSet<String>,
}

impl CacheEntry {
    /// A fresh entry: empty delivered set, stamped `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        CacheEntry {
            last_mutation: now,
            delivered: BTreeSet::new(),
        }
    }
}

/// The full uniqueness cache, keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedCache {
    entries: HashMap<UserId, CacheEntry>,
}

impl UsedCache {
    pub fn new() -> Self {
        UsedCache::default()
    }

    /// Looks up a user's entry without creating it.
    pub fn get(&self, user: UserId) -> Option<&CacheEntry> {
        self.entries.get(&user)
    }

    /// Returns the user's entry, creating a fresh one stamped `now` if absent.
    ///
    /// An existing entry is returned unchanged; its mutation time is not
    /// updated.
    pub fn touch(&mut self, user: UserId, now: DateTime<Utc>) -> &CacheEntry {
        self.entries.entry(user).or_insert_with(|| CacheEntry::fresh(now))
    }

    /// Unions `fragments` into the user's delivered set and stamps the entry
    /// with `now`. Creates the entry if absent.
    pub fn record_delivery<I>(&mut self, user: UserId, now: DateTime<Utc>, fragments: I)
    where
        I: IntoIterator<Item = String>,
    {
        let entry = self.entries.entry(user).or_insert_with(|| CacheEntry::fresh(now));
        entry.delivered.extend(fragments);
        entry.last_mutation = now;
    }

    /// Empties the user's delivered set and stamps the entry with `now`.
    pub fn reset(&mut self, user: UserId, now: DateTime<Utc>) {
        self.entries.insert(user, CacheEntry::fresh(now));
    }

    /// An immutable snapshot of every user's delivered set, for handing to
    /// compose workers.
    pub fn delivered_snapshot(&self) -> HashMap<UserId, BTreeSet<String>> {
        self.entries
            .iter()
            .map(|(user, entry)| (*user, entry.delivered.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
