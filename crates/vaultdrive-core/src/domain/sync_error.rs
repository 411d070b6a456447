//! Sync failure taxonomy
//!
//! Failure classes with different blast radii:
//!
//! - [`SyncError::Auth`]: token refresh failed; the whole sync aborts.
//! - [`SyncError::Vault`]: the local side (vault enumeration or the
//!   persisted sync state) is unavailable; without it neither transfers
//!   nor a safe deletion sweep are possible, so the whole sync aborts.
//! - [`SyncError::FolderResolution`]: a remote folder path could not be
//!   resolved; files under it are skipped for this run.
//! - [`SyncError::Transfer`]: one item's upload/download/delete failed;
//!   its record entry is left untouched so the next run retries it.
//! - [`SyncError::Listing`]: one folder-listing page failed; that page's
//!   results are dropped and traversal continues.
//!
//! Only the fatal classes (`Auth`, `Vault`) may escape an engine call,
//! plus `FolderResolution` for the mirror folder itself, since without a
//! mirror there is no sync target. Everything else is caught at the item
//! level and surfaced through the batch report.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// The operation a transfer failure occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    /// Local→remote content upload (create or update)
    Upload,
    /// Remote→local content fetch (download or export)
    Download,
    /// Remote object deletion during push reconciliation
    DeleteRemote,
    /// Local file deletion during pull reconciliation
    DeleteLocal,
}

impl Display for TransferOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransferOp::Upload => write!(f, "upload"),
            TransferOp::Download => write!(f, "download"),
            TransferOp::DeleteRemote => write!(f, "remote delete"),
            TransferOp::DeleteLocal => write!(f, "local delete"),
        }
    }
}

/// A sync failure, classified by how much of the run it poisons
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Token refresh did not yield a usable access token (fatal)
    #[error("authentication failed: {reason}")]
    Auth {
        /// What went wrong during the refresh exchange
        reason: String,
    },

    /// The vault or the persisted sync state is unavailable (fatal)
    #[error("vault unavailable: {reason}")]
    Vault {
        /// What failed on the local side
        reason: String,
    },

    /// A remote folder path could not be searched or created
    #[error("could not resolve remote folder '{path}': {reason}")]
    FolderResolution {
        /// The folder path that failed to resolve
        path: String,
        /// What the remote store reported
        reason: String,
    },

    /// A single item's transfer failed
    #[error("{op} failed for '{path}': {reason}")]
    Transfer {
        /// The operation that failed
        op: TransferOp,
        /// The vault-relative path of the affected item
        path: String,
        /// What the store reported
        reason: String,
    },

    /// A folder-listing page could not be fetched during traversal
    #[error("listing failed under '{folder_path}': {reason}")]
    Listing {
        /// The vault-relative prefix of the folder being listed
        folder_path: String,
        /// What the remote store reported
        reason: String,
    },
}

impl SyncError {
    /// Returns true if this error aborts the whole sync rather than one item
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Auth { .. } | SyncError::Vault { .. })
    }
}
