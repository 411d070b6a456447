//! Local→remote sync engine
//!
//! One [`PushEngine::push`] call is one session: snapshot the vault,
//! compare against the persisted record, upload what changed in bounded
//! batches, reconcile remote deletions, and commit the updated record.
//!
//! Per-item failures are folded into the report and never abort the run.
//! Only an unusable token, an unreachable vault, or a mirror folder that
//! cannot be resolved aborts before any transfer starts.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use vaultdrive_core::config::{SettingsStore, SyncConfig};
use vaultdrive_core::domain::newtypes::VaultPath;
use vaultdrive_core::domain::record::{SyncRecordStore, VaultFileRecord};
use vaultdrive_core::domain::session::{
    ItemOutcome, SyncDirection, SyncReport, SyncSession,
};
use vaultdrive_core::domain::sync_error::{SyncError, TransferOp};
use vaultdrive_core::ports::remote_store::{AccessToken, IRemoteStore};
use vaultdrive_core::ports::token_manager::ITokenManager;
use vaultdrive_core::ports::vault_store::{IVaultStore, VaultFile};

use crate::batch::BatchScheduler;
use crate::detector;
use crate::mime;
use crate::resolver::{search_or_create, RemoteFolderResolver};

/// Uploads vault changes into the remote mirror folder
pub struct PushEngine {
    vault: Arc<dyn IVaultStore>,
    remote: Arc<dyn IRemoteStore>,
    tokens: Arc<dyn ITokenManager>,
    settings: Arc<SettingsStore>,
}

impl PushEngine {
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

    /// Runs one push session and returns its report
    ///
    /// # Errors
    /// Returns [`SyncError::Auth`] when no usable access token can be
    /// obtained, [`SyncError::Vault`] when the vault or the persisted sync
    /// state cannot be read or committed, and
    /// [`SyncError::FolderResolution`] when the mirror folder itself cannot
    /// be resolved. Everything else lands in the report as a failed item.
    #[tracing::instrument(skip_all, fields(vault = %config.vault_name))]
    pub async fn push(&self, config: &SyncConfig) -> Result<SyncReport, SyncError> {
        let token = self.tokens.ensure_valid().await?;

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
            SyncDirection::Push,
            config.concurrency_limit,
            config.root_folder.id.clone(),
            mirror,
        );
        let mut report = SyncReport::new(&session);

        let persisted = self.settings.settings().map_err(|err| SyncError::Vault {
            reason: format!("cannot load sync state: {err:#}"),
        })?;
        let records = SyncRecordStore::from_record(persisted.sync_record);

        let local_files = self.vault.list_files().await.map_err(|err| SyncError::Vault {
            reason: format!("cannot enumerate vault files: {err:#}"),
        })?;

        info!(
            session = %session.id(),
            local_files = local_files.len(),
            recorded = records.len(),
            "Starting push"
        );

        let mut local_paths = HashSet::with_capacity(local_files.len());
        let mut pending = Vec::new();
        for file in local_files {
            local_paths.insert(file.path.clone());
            let record = records.get(&file.path);
            if detector::should_push(record.as_ref(), file.mtime_ms) {
                pending.push(file);
            } else {
                report.record_skipped();
            }
        }
        debug!(pending = pending.len(), "Change detection complete");

        let scheduler = BatchScheduler::new(session.concurrency_limit());
        let resolver = RemoteFolderResolver::new(
            Arc::clone(&self.remote),
            session.vault_folder_id().clone(),
        );

        let uploads = scheduler
            .run(pending, |file| {
                self.upload_one(&token, &session, &resolver, &records, file)
            })
            .await;
        for outcome in uploads {
            report.push_outcome(outcome);
        }

        // Record entries whose local file is gone get their remote
        // counterpart deleted. A failed delete keeps the entry so the next
        // run retries it.
        let mut stale: Vec<VaultPath> = records
            .paths()
            .into_iter()
            .filter(|path| !local_paths.contains(path))
            .collect();
        stale.sort();
        debug!(stale = stale.len(), "Reconciling remote deletions");

        let deletions = scheduler
            .run(stale, |path| self.delete_one(&token, &records, path))
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
            "Push complete"
        );
        Ok(report)
    }

    /// Uploads one changed file, advancing its record entry on success
    async fn upload_one(
        &self,
        token: &AccessToken,
        session: &SyncSession,
        resolver: &RemoteFolderResolver,
        records: &SyncRecordStore,
        file: VaultFile,
    ) -> ItemOutcome {
        match self.try_upload(token, session, resolver, records, &file).await {
            Ok(()) => ItemOutcome::Transferred { path: file.path },
            Err(error) => {
                warn!(path = %file.path, error = %error, "Upload failed");
                ItemOutcome::Failed {
                    path: file.path,
                    error,
                }
            }
        }
    }

    async fn try_upload(
        &self,
        token: &AccessToken,
        session: &SyncSession,
        resolver: &RemoteFolderResolver,
        records: &SyncRecordStore,
        file: &VaultFile,
    ) -> Result<(), SyncError> {
        let transfer_err = |err: anyhow::Error| SyncError::Transfer {
            op: TransferOp::Upload,
            path: file.path.as_str().to_string(),
            reason: format!("{err:#}"),
        };

        let parent_id = match file.path.parent() {
            Some(folder) => resolver.resolve_path(token, &folder).await?,
            None => session.vault_folder_id().clone(),
        };

        let content = self.read_content(file).await.map_err(transfer_err)?;
        let mime_type = mime::mime_type_for_extension(file.extension.as_deref());
        let name = file.path.file_name();

        let remote_id = match records.get(&file.path) {
            Some(entry) => {
                self.remote
                    .upload_existing(token, &entry.remote_id, name, mime_type, &content)
                    .await
            }
            None => {
                self.remote
                    .upload_new(token, &parent_id, name, mime_type, &content)
                    .await
            }
        }
        .map_err(transfer_err)?;

        records.upsert(
            file.path.clone(),
            VaultFileRecord {
                remote_id,
                last_modified: file.mtime_ms,
            },
        );
        debug!(path = %file.path, size = content.len(), "Uploaded");
        Ok(())
    }

    /// Reads a file's content, as text for textual extensions
    async fn read_content(&self, file: &VaultFile) -> anyhow::Result<Vec<u8>> {
        if mime::is_textual_extension(file.extension.as_deref()) {
            Ok(self.vault.read_text(&file.path).await?.into_bytes())
        } else {
            self.vault.read_bytes(&file.path).await
        }
    }

    /// Deletes one stale remote object, dropping its record entry on success
    async fn delete_one(
        &self,
        token: &AccessToken,
        records: &SyncRecordStore,
        path: VaultPath,
    ) -> ItemOutcome {
        let Some(entry) = records.get(&path) else {
            // Entry already gone; nothing left to reconcile.
            return ItemOutcome::Deleted { path };
        };
        match self.remote.delete(token, &entry.remote_id).await {
            Ok(()) => {
                records.remove(&path);
                debug!(path = %path, remote_id = %entry.remote_id, "Remote object deleted");
                ItemOutcome::Deleted { path }
            }
            Err(err) => {
                let error = SyncError::Transfer {
                    op: TransferOp::DeleteRemote,
                    path: path.as_str().to_string(),
                    reason: format!("{err:#}"),
                };
                warn!(path = %path, error = %error, "Remote delete failed");
                ItemOutcome::Failed { path, error }
            }
        }
    }
}
