//! Settings blob and per-call sync configuration
//!
//! All persisted state lives in a single JSON settings blob: credentials,
//! the selected root folder, the candidate root folders offered to the
//! user, the vault name, the sync record, and the last-sync timestamp.
//!
//! Engines never hold a mutable settings object. They take an
//! immutable-on-read [`SyncConfig`] per call; the two pieces that do
//! mutate, credentials (via token refresh) and the sync record (via a
//! completed session), go back through [`SettingsStore`] at those two
//! well-defined boundaries only.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::credentials::Credentials;
use crate::domain::errors::DomainError;
use crate::domain::newtypes::RemoteId;
use crate::domain::record::SyncRecord;

/// Default per-batch concurrency limit
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// Identity of a remote container node
///
/// The *selected* root folder is a fixed `RemoteFolderRef` chosen by the
/// user; the vault's mirror folder is created directly under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolderRef {
    /// Remote object id of the folder
    pub id: RemoteId,
    /// Display name of the folder
    pub name: String,
}

/// The persisted settings blob
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Account credentials; `None` until the host completes authentication
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// The root folder the user selected as the mirror's parent
    #[serde(default)]
    pub root_folder: Option<RemoteFolderRef>,
    /// Folders offered to the user as root candidates
    #[serde(default)]
    pub candidate_roots: Vec<RemoteFolderRef>,
    /// The vault's name, which names its remote mirror folder
    #[serde(default)]
    pub vault_name: String,
    /// The persisted sync record
    #[serde(default)]
    pub sync_record: SyncRecord,
    /// When the last sync invocation completed
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

/// Immutable per-call configuration handed to an engine
///
/// Built from a settings snapshot at invocation start; never written back.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// The vault's name (names the remote mirror folder)
    pub vault_name: String,
    /// The selected root folder
    pub root_folder: RemoteFolderRef,
    /// Per-batch concurrency limit
    pub concurrency_limit: usize,
}

impl SyncConfig {
    /// Builds the per-call configuration from a settings snapshot
    ///
    /// # Errors
    /// Returns [`DomainError::IncompleteSettings`] when no root folder has
    /// been selected or the vault name is empty.
    pub fn from_settings(settings: &Settings) -> Result<Self, DomainError> {
        let root_folder = settings.root_folder.clone().ok_or_else(|| {
            DomainError::IncompleteSettings("no root folder selected".to_string())
        })?;

        if settings.vault_name.is_empty() {
            return Err(DomainError::IncompleteSettings(
                "vault name is empty".to_string(),
            ));
        }

        Ok(Self {
            vault_name: settings.vault_name.clone(),
            root_folder,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        })
    }

    /// Overrides the per-batch concurrency limit
    #[must_use]
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }
}

/// Owner of the settings blob file
///
/// Reads hand out cloned snapshots; the two mutation paths (credential
/// refresh, end-of-session record commit) persist immediately with a
/// temp-file + rename write so a crash never leaves a torn blob.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    inner: Mutex<Settings>,
}

impl SettingsStore {
    /// Opens the store at `path`, loading the blob if it exists
    ///
    /// A missing file yields default (empty) settings; the file is created
    /// on first save.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let settings = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings from {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse settings from {}", path.display()))?
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            inner: Mutex::new(settings),
        })
    }

    /// Platform-appropriate default path for the settings blob
    ///
    /// Typically `$XDG_CONFIG_HOME/vaultdrive/settings.json` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("vaultdrive")
            .join("settings.json")
    }

    /// Returns the path of the blob file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a snapshot of the current settings
    pub fn settings(&self) -> anyhow::Result<Settings> {
        Ok(self.lock()?.clone())
    }

    /// Returns the current credentials, if any
    pub fn credentials(&self) -> anyhow::Result<Option<Credentials>> {
        Ok(self.lock()?.credentials.clone())
    }

    /// Replaces the stored credentials and persists the blob
    ///
    /// Called by the token manager after a successful refresh, before the
    /// refreshed token is handed to the session.
    pub fn update_credentials(&self, credentials: Credentials) -> anyhow::Result<()> {
        let mut guard = self.lock()?;
        guard.credentials = Some(credentials);
        self.persist(&guard)
    }

    /// Replaces the sync record and last-sync timestamp and persists the blob
    ///
    /// Called exactly once per session, at its end.
    pub fn commit_sync(&self, record: SyncRecord, last_sync: DateTime<Utc>) -> anyhow::Result<()> {
        let mut guard = self.lock()?;
        guard.sync_record = record;
        guard.last_sync = Some(last_sync);
        self.persist(&guard)
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Settings>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))
    }

    /// Writes the blob atomically: temp file in the same directory, then rename
    fn persist(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(settings)
            .context("failed to serialize settings")?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        Ok(())
    }
}
