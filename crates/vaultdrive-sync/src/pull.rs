//! Remote→local sync engine
//!
//! One [`PullEngine::pull`] call is one session: walk the mirror folder
//! tree breadth-first, map every remote object onto a vault-relative
//! path, download what is new or newer in bounded batches, reconcile
//! local deletions, and commit the updated record.
//!
//! A folder whose listing fails drops out of the walk; its failure is
//! reported and the rest of the tree still syncs. Editor-native objects
//! are exported as markdown text instead of downloaded.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use vaultdrive_core::config::{SettingsStore, SyncConfig};
use vaultdrive_core::domain::newtypes::{RemoteId, VaultPath};
use vaultdrive_core::domain::record::{SyncRecordStore, VaultFileRecord};
use vaultdrive_core::domain::session::{
    ItemOutcome, SyncDirection, SyncReport, SyncSession,
};
use vaultdrive_core::domain::sync_error::{SyncError, TransferOp};
use vaultdrive_core::ports::remote_store::{
    AccessToken, IRemoteStore, RemoteObjectMetadata,
};
use vaultdrive_core::ports::token_manager::ITokenManager;
use vaultdrive_core::ports::vault_store::{IVaultStore, VaultFile};

use crate::batch::BatchScheduler;
use crate::detector;
use crate::resolver::search_or_create;

/// Everything one folder listing produced
struct FolderListing {
    /// Vault-relative prefix of the listed folder; `None` for the mirror root
    prefix: Option<VaultPath>,
    /// Subfolders to walk next, with their vault-relative paths
    subfolders: Vec<(RemoteId, VaultPath)>,
    /// Files found, keyed by their vault-relative paths
    files: Vec<(VaultPath, RemoteObjectMetadata)>,
    /// Set when a page of this folder could not be fetched
    failure: Option<SyncError>,
}

/// Downloads remote mirror changes into the vault
pub struct PullEngine {
    vault: Arc<dyn IVaultStore>,
    remote: Arc<dyn IRemoteStore>,
    tokens: Arc<dyn ITokenManager>,
    settings: Arc<SettingsStore>,
}

impl PullEngine {
    /// Creates an engine over the given port implementations
    pub fn new(
        vault: Arc<dyn IVaultStore>,
        remote: Arc<dyn IRemoteStore>,
        tokens: Arc<dyn ITokenManager>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            vault,
            remote,
            tokens,
            settings,
        }
    }

    /// Runs one pull session and returns its report
    ///
    /// # Errors
    /// Returns [`SyncError::Auth`] when no usable access token can be
    /// obtained, [`SyncError::Vault`] when the vault or the persisted sync
    /// state cannot be read or committed, and
    /// [`SyncError::FolderResolution`] when the mirror folder itself cannot
    /// be resolved. Dropped listings and per-item failures land in the
    /// report instead.
    #[tracing::instrument(skip_all, fields(vault = %config.vault_name))]
    pub async fn pull(&self, config: &SyncConfig) -> Result<SyncReport, SyncError> {
        let token = self.tokens.ensure_valid().await?;

        // The mirror's own name doubles as the path prefix failures are
        // reported under, so it must itself be a usable path segment.
        let mirror_label =
            VaultPath::new(config.vault_name.clone()).map_err(|err| {
                SyncError::FolderResolution {
                    path: config.vault_name.clone(),
                    reason: format!("vault name is not usable as a sync path: {err}"),
                }
            })?;

        let mirror = search_or_create(
            self.remote.as_ref(),
            &token,
            &config.root_folder.id,
            &config.vault_name,
        )
        .await
        .map_err(|err| SyncError::FolderResolution {
            path: config.vault_name.clone(),
            reason: format!("{err:#}"),
        })?;

        let session = SyncSession::new(
            SyncDirection::Pull,
            config.concurrency_limit,
            config.root_folder.id.clone(),
            mirror,
        );
        let mut report = SyncReport::new(&session);

        let persisted = self.settings.settings().map_err(|err| SyncError::Vault {
            reason: format!("cannot load sync state: {err:#}"),
        })?;
        let records = SyncRecordStore::from_record(persisted.sync_record);

        let scheduler = BatchScheduler::new(session.concurrency_limit());

        let remote_files = self
            .traverse(&token, &session, &scheduler, &mirror_label, &mut report)
            .await;
        let remote_paths: HashSet<VaultPath> = remote_files.keys().cloned().collect();

        let local_files = self.vault.list_files().await.map_err(|err| SyncError::Vault {
            reason: format!("cannot enumerate vault files: {err:#}"),
        })?;
        let local_map: HashMap<VaultPath, VaultFile> = local_files
            .into_iter()
            .map(|file| (file.path.clone(), file))
            .collect();

        info!(
            session = %session.id(),
            remote_files = remote_files.len(),
            local_files = local_map.len(),
            recorded = records.len(),
            "Starting pull"
        );

        let mut pending = Vec::new();
        for (path, meta) in remote_files {
            let record = records.get(&path);
            if detector::should_pull(record.as_ref(), local_map.get(&path), &meta) {
                pending.push((path, meta));
            } else {
                report.record_skipped();
            }
        }
        debug!(pending = pending.len(), "Change detection complete");

        let downloads = scheduler
            .run(pending, |(path, meta)| {
                self.fetch_one(&token, &records, path, meta)
            })
            .await;
        for outcome in downloads {
            report.push_outcome(outcome);
        }

        // Recorded local files whose remote counterpart is gone get
        // deleted. Files the record has never seen are left alone, so an
        // unsynced draft never disappears.
        let mut stale: Vec<VaultPath> = local_map
            .keys()
            .filter(|path| !remote_paths.contains(*path) && records.contains(path))
            .cloned()
            .collect();
        stale.sort();
        debug!(stale = stale.len(), "Reconciling local deletions");

        let deletions = scheduler
            .run(stale, |path| self.delete_one(&records, path))
            .await;
        for outcome in deletions {
            report.push_outcome(outcome);
        }

        self.settings
            .commit_sync(records.snapshot(), Utc::now())
            .map_err(|err| SyncError::Vault {
                reason: format!("cannot persist sync record: {err:#}"),
            })?;

        report.set_duration_ms(session.elapsed_ms());
        info!(
            session = %session.id(),
            transferred = report.files_transferred(),
            skipped = report.files_skipped(),
            deleted = report.files_deleted(),
            failed = report.files_failed(),
            duration_ms = report.duration_ms(),
            "Pull complete"
        );
        Ok(report)
    }

    /// Walks the mirror tree breadth-first, listing folders in batches
    ///
    /// Returns every discovered file keyed by its vault-relative path.
    /// Failed listings are folded into the report; their subtrees are
    /// simply absent from the result.
    async fn traverse(
        &self,
        token: &AccessToken,
        session: &SyncSession,
        scheduler: &BatchScheduler,
        mirror_label: &VaultPath,
        report: &mut SyncReport,
    ) -> BTreeMap<VaultPath, RemoteObjectMetadata> {
        let mut discovered = BTreeMap::new();
        let mut queue: VecDeque<(RemoteId, Option<VaultPath>)> = VecDeque::new();
        queue.push_back((session.vault_folder_id().clone(), None));

        while !queue.is_empty() {
            let take = queue.len().min(scheduler.limit());
            let batch: Vec<(RemoteId, Option<VaultPath>)> = queue.drain(..take).collect();

            let listings = scheduler
                .run(batch, |(folder_id, prefix)| {
                    self.list_folder(token, folder_id, prefix)
                })
                .await;

            for listing in listings {
                if let Some(error) = listing.failure {
                    let path = listing
                        .prefix
                        .clone()
                        .unwrap_or_else(|| mirror_label.clone());
                    report.record_listing_failure(path, error);
                }
                for (folder_id, path) in listing.subfolders {
                    queue.push_back((folder_id, Some(path)));
                }
                for (path, meta) in listing.files {
                    discovered.insert(path, meta);
                }
            }
        }

        debug!(files = discovered.len(), "Remote traversal complete");
        discovered
    }

    /// Lists all pages of one folder's children
    ///
    /// A page failure ends the walk of this folder; children already
    /// fetched are kept so the damage stays as small as possible.
    async fn list_folder(
        &self,
        token: &AccessToken,
        folder_id: RemoteId,
        prefix: Option<VaultPath>,
    ) -> FolderListing {
        let mut subfolders = Vec::new();
        let mut files = Vec::new();
        let mut failure = None;
        let mut page_token: Option<String> = None;

        loop {
            let page = match self
                .remote
                .list_children(token, &folder_id, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    let folder_path = prefix
                        .as_ref()
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_default();
                    failure = Some(SyncError::Listing {
                        folder_path,
                        reason: format!("{err:#}"),
                    });
                    break;
                }
            };

            for child in page.files {
                let Some(child_path) = join_child(prefix.as_ref(), &child.name) else {
                    warn!(
                        folder = %folder_id,
                        name = %child.name,
                        "Skipping remote child with unusable name"
                    );
                    continue;
                };
                if child.is_folder() {
                    subfolders.push((child.id.clone(), child_path));
                } else {
                    files.push((child_path, child));
                }
            }

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        FolderListing {
            prefix,
            subfolders,
            files,
            failure,
        }
    }

    /// Fetches one remote file into the vault, advancing its record entry
    async fn fetch_one(
        &self,
        token: &AccessToken,
        records: &SyncRecordStore,
        path: VaultPath,
        meta: RemoteObjectMetadata,
    ) -> ItemOutcome {
        match self.try_fetch(token, records, &path, &meta).await {
            Ok(()) => ItemOutcome::Transferred { path },
            Err(error) => {
                warn!(path = %path, error = %error, "Download failed");
                ItemOutcome::Failed { path, error }
            }
        }
    }

    async fn try_fetch(
        &self,
        token: &AccessToken,
        records: &SyncRecordStore,
        path: &VaultPath,
        meta: &RemoteObjectMetadata,
    ) -> Result<(), SyncError> {
        let transfer_err = |err: anyhow::Error| SyncError::Transfer {
            op: TransferOp::Download,
            path: path.as_str().to_string(),
            reason: format!("{err:#}"),
        };

        let content = if meta.is_editor_native() {
            self.remote
                .export_text(token, &meta.id)
                .await
                .map_err(transfer_err)?
                .into_bytes()
        } else {
            self.remote
                .download(token, &meta.id)
                .await
                .map_err(transfer_err)?
        };

        if let Some(parent) = path.parent() {
            self.vault
                .create_folder(&parent)
                .await
                .map_err(transfer_err)?;
        }

        let mtime_ms = meta.modified_ms();
        self.vault
            .write_file(path, &content, mtime_ms)
            .await
            .map_err(transfer_err)?;

        records.upsert(
            path.clone(),
            VaultFileRecord {
                remote_id: meta.id.clone(),
                last_modified: mtime_ms.unwrap_or_else(|| Utc::now().timestamp_millis()),
            },
        );
        debug!(path = %path, size = content.len(), "Downloaded");
        Ok(())
    }

    /// Deletes one stale local file, dropping its record entry on success
    async fn delete_one(&self, records: &SyncRecordStore, path: VaultPath) -> ItemOutcome {
        match self.vault.delete_file(&path).await {
            Ok(()) => {
                records.remove(&path);
                debug!(path = %path, "Local file deleted");
                ItemOutcome::Deleted { path }
            }
            Err(err) => {
                let error = SyncError::Transfer {
                    op: TransferOp::DeleteLocal,
                    path: path.as_str().to_string(),
                    reason: format!("{err:#}"),
                };
                warn!(path = %path, error = %error, "Local delete failed");
                ItemOutcome::Failed { path, error }
            }
        }
    }
}

/// Maps a remote child name onto a vault-relative path
///
/// Returns `None` for names the path rules reject (separators, dot
/// segments); such objects are skipped rather than failed.
fn join_child(prefix: Option<&VaultPath>, name: &str) -> Option<VaultPath> {
    match prefix {
        Some(parent) => parent.join(name).ok(),
        None => VaultPath::new(name.to_string()).ok(),
    }
}
