//! Remote folder path resolution
//!
//! Maps vault-relative folder paths onto remote folder ids under a base
//! folder (the vault's mirror), creating missing folders on the way. A
//! resolver lives for exactly one sync pass.
//!
//! ## Memoization and single-flight
//!
//! Batch workers hit the resolver concurrently, often for the same
//! ancestor chain (`a`, `a/b`, ...). Each cumulative path gets one memo
//! cell; concurrent requests for the same path share a single in-flight
//! search-or-create instead of racing duplicate creates. A failed
//! resolution leaves its cell unset, so a later file under the same path
//! retries within the same pass.
//!
//! Segments of one path resolve strictly in order (each parent id feeds
//! the next search); independent paths resolve concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::debug;

use vaultdrive_core::domain::newtypes::{RemoteId, VaultPath};
use vaultdrive_core::domain::sync_error::SyncError;
use vaultdrive_core::ports::remote_store::{AccessToken, IRemoteStore};

/// Finds a folder named `name` under `parent`, creating it when absent
///
/// The search is idempotent; only a miss mutates the remote side. Also
/// used directly by the engines to resolve the vault's mirror folder
/// under the selected root.
pub async fn search_or_create(
    remote: &dyn IRemoteStore,
    token: &AccessToken,
    parent: &RemoteId,
    name: &str,
) -> anyhow::Result<RemoteId> {
    if let Some(existing) = remote.find_folder(token, parent, name).await? {
        debug!(folder = %existing, name, "Reusing existing remote folder");
        return Ok(existing);
    }
    remote.create_folder(token, parent, name).await
}

/// Per-pass memoizing resolver for remote folder paths
pub struct RemoteFolderResolver {
    /// Remote store the folders live in
    remote: Arc<dyn IRemoteStore>,
    /// Folder every resolved path is anchored under (the mirror folder)
    base: RemoteId,
    /// One single-flight cell per cumulative folder path
    memo: DashMap<String, Arc<OnceCell<RemoteId>>>,
}

impl RemoteFolderResolver {
    /// Creates a resolver anchored at `base` for one sync pass
    #[must_use]
    pub fn new(remote: Arc<dyn IRemoteStore>, base: RemoteId) -> Self {
        Self {
            remote,
            base,
            memo: DashMap::new(),
        }
    }

    /// Resolves a folder path to its remote id, creating missing segments
    ///
    /// # Errors
    /// Returns [`SyncError::FolderResolution`] naming the deepest
    /// cumulative path that could not be resolved; files under it must be
    /// skipped, never placed elsewhere.
    pub async fn resolve_path(
        &self,
        token: &AccessToken,
        path: &VaultPath,
    ) -> Result<RemoteId, SyncError> {
        let mut parent = self.base.clone();
        let mut cumulative = String::new();

        for segment in path.segments() {
            if !cumulative.is_empty() {
                cumulative.push('/');
            }
            cumulative.push_str(segment);

            parent = self
                .resolve_segment(token, &parent, &cumulative, segment)
                .await?;
        }

        Ok(parent)
    }

    /// Resolves one segment under its parent through the memo table
    async fn resolve_segment(
        &self,
        token: &AccessToken,
        parent: &RemoteId,
        cumulative: &str,
        name: &str,
    ) -> Result<RemoteId, SyncError> {
        let cell = self
            .memo
            .entry(cumulative.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let resolved = cell
            .get_or_try_init(|| async {
                search_or_create(self.remote.as_ref(), token, parent, name)
                    .await
                    .map_err(|e| SyncError::FolderResolution {
                        path: cumulative.to_string(),
                        reason: format!("{e:#}"),
                    })
            })
            .await?;

        Ok(resolved.clone())
    }
}
