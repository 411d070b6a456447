//! Sync record: the persisted path→remote-identity mapping
//!
//! The record is the engine's single source of truth for drift detection.
//! A path is present if and only if the engine believes the remote object
//! for that path currently exists and was successfully synchronized;
//! absence means "never synced" or "deleted".
//!
//! [`SyncRecordStore`] is the in-session mutable view. Batch workers write
//! disjoint keys concurrently, so the store is backed by a sharded map
//! rather than a single mutex. It is loaded from the settings blob when a
//! session starts and committed back when the session ends.

use std::collections::BTreeMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::newtypes::{RemoteId, VaultPath};

/// Per-path sync state: remote identity plus the last-synced timestamp
///
/// `last_modified` is epoch milliseconds. On push it is the local mtime at
/// upload time; on pull it is the remote object's modification time.
/// Renames are not modeled: a renamed path shows up as a delete plus a
/// create, never as an id change on the old entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultFileRecord {
    /// Identity of the remote counterpart
    pub remote_id: RemoteId,
    /// Last-synced timestamp in epoch milliseconds
    pub last_modified: i64,
}

/// The persisted form of the record: an ordered path→state map
pub type SyncRecord = BTreeMap<VaultPath, VaultFileRecord>;

/// In-session view of the sync record, safe for concurrent batch workers
#[derive(Debug, Default)]
pub struct SyncRecordStore {
    entries: DashMap<VaultPath, VaultFileRecord>,
}

impl SyncRecordStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from a persisted record
    #[must_use]
    pub fn from_record(record: SyncRecord) -> Self {
        let entries = DashMap::new();
        for (path, entry) in record {
            entries.insert(path, entry);
        }
        Self { entries }
    }

    /// Returns the entry for a path, if present
    #[must_use]
    pub fn get(&self, path: &VaultPath) -> Option<VaultFileRecord> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }

    /// Returns true if the path has an entry
    #[must_use]
    pub fn contains(&self, path: &VaultPath) -> bool {
        self.entries.contains_key(path)
    }

    /// Inserts or replaces the entry for a path
    pub fn upsert(&self, path: VaultPath, entry: VaultFileRecord) {
        self.entries.insert(path, entry);
    }

    /// Removes the entry for a path, returning it if present
    pub fn remove(&self, path: &VaultPath) -> Option<VaultFileRecord> {
        self.entries.remove(path).map(|(_, entry)| entry)
    }

    /// Returns all recorded paths
    #[must_use]
    pub fn paths(&self) -> Vec<VaultPath> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the current state into its ordered persisted form
    #[must_use]
    pub fn snapshot(&self) -> SyncRecord {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
