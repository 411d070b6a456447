//! Local vault adapter over the real filesystem
//!
//! Implements [`IVaultStore`] with `tokio::fs` against a vault root
//! directory. Writes go to a temp file first and are renamed into place,
//! so a crash never leaves a half-written note.
//!
//! Enumeration skips dot-prefixed entries (editor configuration, trash
//! folders) and entries whose names cannot be expressed as vault paths;
//! such files simply do not take part in syncing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::Context;
use filetime::FileTime;
use tracing::{debug, instrument, warn};

use vaultdrive_core::domain::newtypes::VaultPath;
use vaultdrive_core::ports::vault_store::{IVaultStore, VaultFile};

/// Bridges the [`IVaultStore`] port to a directory on disk
#[derive(Debug, Clone)]
pub struct VaultStoreAdapter {
    root: PathBuf,
}

impl VaultStoreAdapter {
    /// Creates an adapter rooted at the given vault directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the vault root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, path: &VaultPath) -> PathBuf {
        let mut absolute = self.root.clone();
        for segment in path.segments() {
            absolute.push(segment);
        }
        absolute
    }
}

#[async_trait::async_trait]
impl IVaultStore for VaultStoreAdapter {
    #[instrument(skip(self))]
    async fn list_files(&self) -> anyhow::Result<Vec<VaultFile>> {
        let mut files = Vec::new();
        let mut pending = vec![(self.root.clone(), String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .with_context(|| format!("cannot read folder {}", dir.display()))?;

            while let Some(entry) = entries.next_entry().await? {
                let name = match entry.file_name().into_string() {
                    Ok(name) => name,
                    Err(raw) => {
                        warn!(name = ?raw, "Skipping entry with a non-UTF-8 name");
                        continue;
                    }
                };
                if name.starts_with('.') {
                    continue;
                }

                let rel = if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}/{name}")
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), rel));
                } else if file_type.is_file() {
                    let path = match VaultPath::new(rel) {
                        Ok(path) => path,
                        Err(err) => {
                            warn!(error = %err, "Skipping entry outside the path rules");
                            continue;
                        }
                    };
                    let metadata = entry.metadata().await?;
                    let extension = path.extension().map(str::to_string);
                    files.push(VaultFile {
                        path,
                        extension,
                        mtime_ms: mtime_epoch_ms(&metadata)?,
                        size: metadata.len(),
                    });
                }
                // Symlinks and other special entries are not synced.
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(files = files.len(), "Vault enumerated");
        Ok(files)
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn get_file(&self, path: &VaultPath) -> anyhow::Result<Option<VaultFile>> {
        let metadata = match tokio::fs::metadata(self.absolute(path)).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if !metadata.is_file() {
            return Ok(None);
        }
        Ok(Some(VaultFile {
            path: path.clone(),
            extension: path.extension().map(str::to_string),
            mtime_ms: mtime_epoch_ms(&metadata)?,
            size: metadata.len(),
        }))
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn read_text(&self, path: &VaultPath) -> anyhow::Result<String> {
        tokio::fs::read_to_string(self.absolute(path))
            .await
            .with_context(|| format!("cannot read {path}"))
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn read_bytes(&self, path: &VaultPath) -> anyhow::Result<Vec<u8>> {
        tokio::fs::read(self.absolute(path))
            .await
            .with_context(|| format!("cannot read {path}"))
    }

    #[instrument(skip(self, data), fields(path = %path, bytes = data.len()))]
    async fn write_file(
        &self,
        path: &VaultPath,
        data: &[u8],
        mtime_ms: Option<i64>,
    ) -> anyhow::Result<()> {
        let target = self.absolute(path);

        // The temp file sits next to the target so the rename cannot
        // cross filesystems.
        let tmp_path = {
            let mut p = target.as_os_str().to_owned();
            p.push(".tmp");
            PathBuf::from(p)
        };

        tokio::fs::write(&tmp_path, data)
            .await
            .with_context(|| format!("cannot write {path}"))?;
        tokio::fs::rename(&tmp_path, &target)
            .await
            .with_context(|| format!("cannot replace {path}"))?;

        if let Some(ms) = mtime_ms {
            let stamp = FileTime::from_unix_time(
                ms.div_euclid(1000),
                (ms.rem_euclid(1000) * 1_000_000) as u32,
            );
            tokio::task::spawn_blocking(move || filetime::set_file_mtime(&target, stamp))
                .await?
                .with_context(|| format!("cannot stamp mtime on {path}"))?;
        }

        debug!("write complete");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn create_folder(&self, path: &VaultPath) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(self.absolute(path))
            .await
            .with_context(|| format!("cannot create folder {path}"))
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete_file(&self, path: &VaultPath) -> anyhow::Result<()> {
        tokio::fs::remove_file(self.absolute(path))
            .await
            .with_context(|| format!("cannot delete {path}"))
    }
}

/// Reads a metadata's modification time as epoch milliseconds
fn mtime_epoch_ms(metadata: &std::fs::Metadata) -> anyhow::Result<i64> {
    let modified = metadata
        .modified()
        .context("modification time unavailable")?;
    let ms = match modified.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as i64,
        // Pre-epoch mtimes clamp to zero; they only ever look old.
        Err(_) => 0,
    };
    Ok(ms)
}
