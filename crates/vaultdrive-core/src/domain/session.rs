//! Sync session and report types
//!
//! A [`SyncSession`] is created fresh for every sync invocation and
//! destroyed at completion; it holds no state the caller needs afterwards
//! except the side effects already committed to the sync record. The
//! host-facing result of an invocation is a [`SyncReport`]: explicit
//! per-item outcomes plus counters, returned as a value instead of fired
//! as events.

use chrono::{DateTime, Utc};

use super::newtypes::{RemoteId, SessionId, VaultPath};
use super::sync_error::SyncError;

/// Transfer direction of a sync invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Local→remote
    Push,
    /// Remote→local
    Pull,
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncDirection::Push => write!(f, "push"),
            SyncDirection::Pull => write!(f, "pull"),
        }
    }
}

/// Ephemeral state of one sync invocation
///
/// Created after the mirror folder has been resolved, dropped when the
/// invocation returns. Never persisted.
#[derive(Debug, Clone)]
pub struct SyncSession {
    /// Unique identifier for log correlation
    id: SessionId,
    /// Transfer direction
    direction: SyncDirection,
    /// Maximum number of concurrently in-flight items per batch
    concurrency_limit: usize,
    /// The user-selected root folder the mirror lives under
    root_folder_id: RemoteId,
    /// The vault's remote mirror folder
    vault_folder_id: RemoteId,
    /// When the invocation started
    started_at: DateTime<Utc>,
}

impl SyncSession {
    /// Creates a new session for one sync invocation
    #[must_use]
    pub fn new(
        direction: SyncDirection,
        concurrency_limit: usize,
        root_folder_id: RemoteId,
        vault_folder_id: RemoteId,
    ) -> Self {
        Self {
            id: SessionId::new(),
            direction,
            concurrency_limit,
            root_folder_id,
            vault_folder_id,
            started_at: Utc::now(),
        }
    }

    /// Returns the session's unique identifier
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the transfer direction
    pub fn direction(&self) -> SyncDirection {
        self.direction
    }

    /// Returns the per-batch concurrency limit
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Returns the selected root folder id
    pub fn root_folder_id(&self) -> &RemoteId {
        &self.root_folder_id
    }

    /// Returns the vault mirror folder id
    pub fn vault_folder_id(&self) -> &RemoteId {
        &self.vault_folder_id
    }

    /// Returns when the invocation started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns milliseconds elapsed since the session started
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }
}

/// Outcome of one item inside a batch
///
/// Failures are values, not exceptions: a failed item never cancels its
/// siblings, and its record entry is left untouched so the next run
/// retries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Content crossed the boundary (upload or download)
    Transferred {
        /// The vault-relative path of the item
        path: VaultPath,
    },
    /// The destination-side counterpart was removed during reconciliation
    Deleted {
        /// The vault-relative path of the item
        path: VaultPath,
    },
    /// The item failed; its record entry did not advance
    Failed {
        /// The vault-relative path of the item
        path: VaultPath,
        /// The classified failure
        error: SyncError,
    },
}

impl ItemOutcome {
    /// Returns the path this outcome refers to
    pub fn path(&self) -> &VaultPath {
        match self {
            ItemOutcome::Transferred { path }
            | ItemOutcome::Deleted { path }
            | ItemOutcome::Failed { path, .. } => path,
        }
    }

    /// Returns true if the item failed
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Result of one sync invocation, returned to the host
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Session this report belongs to
    session_id: SessionId,
    /// Transfer direction
    direction: SyncDirection,
    /// Items whose content crossed the boundary
    files_transferred: u64,
    /// Items skipped as unchanged by the change detector
    files_skipped: u64,
    /// Items deleted during reconciliation
    files_deleted: u64,
    /// Items that failed
    files_failed: u64,
    /// Per-item outcomes in completion order (skips are counted, not listed)
    outcomes: Vec<ItemOutcome>,
    /// Wall-clock duration of the invocation in milliseconds
    duration_ms: u64,
}

impl SyncReport {
    /// Creates an empty report for a session
    #[must_use]
    pub fn new(session: &SyncSession) -> Self {
        Self {
            session_id: *session.id(),
            direction: session.direction(),
            files_transferred: 0,
            files_skipped: 0,
            files_deleted: 0,
            files_failed: 0,
            outcomes: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Folds one item outcome into the report
    pub fn push_outcome(&mut self, outcome: ItemOutcome) {
        match &outcome {
            ItemOutcome::Transferred { .. } => self.files_transferred += 1,
            ItemOutcome::Deleted { .. } => self.files_deleted += 1,
            ItemOutcome::Failed { .. } => self.files_failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Counts one unchanged item as skipped
    pub fn record_skipped(&mut self) {
        self.files_skipped += 1;
    }

    /// Records a non-item failure (e.g. a dropped listing page)
    ///
    /// The failure is listed among the outcomes under the folder's path
    /// prefix but does not count toward any per-file counter except
    /// `files_failed`.
    pub fn record_listing_failure(&mut self, path: VaultPath, error: SyncError) {
        self.push_outcome(ItemOutcome::Failed { path, error });
    }

    /// Stamps the wall-clock duration
    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    // --- Getters ---

    /// Returns the session id this report belongs to
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the transfer direction
    pub fn direction(&self) -> SyncDirection {
        self.direction
    }

    /// Returns the number of items transferred
    pub fn files_transferred(&self) -> u64 {
        self.files_transferred
    }

    /// Returns the number of items skipped as unchanged
    pub fn files_skipped(&self) -> u64 {
        self.files_skipped
    }

    /// Returns the number of items deleted during reconciliation
    pub fn files_deleted(&self) -> u64 {
        self.files_deleted
    }

    /// Returns the number of items that failed
    pub fn files_failed(&self) -> u64 {
        self.files_failed
    }

    /// Returns all per-item outcomes
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Returns the invocation duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Returns true if any item failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Iterates over the failed outcomes
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}
