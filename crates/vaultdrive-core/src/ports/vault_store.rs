//! Vault store port (driven/secondary port)
//!
//! This module defines the interface to the local file collection being
//! synchronized. The engine reads file content on demand and never caches
//! it; the vault store is authoritative for content.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - All paths are [`VaultPath`] instances: vault-relative, slash-separated
//!   keys identical to the sync-record keys.
//! - `write_file` accepts an optional mtime stamp so a pulled file can carry
//!   its remote modification time instead of the wall clock at write time.

use crate::domain::newtypes::VaultPath;

/// A file enumerated from the vault
///
/// A lightweight handle: content is not carried here, it is read on demand
/// through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    /// Vault-relative path
    pub path: VaultPath,
    /// Extension of the file name (without the dot), if any
    pub extension: Option<String>,
    /// Last modification time in epoch milliseconds
    pub mtime_ms: i64,
    /// Size in bytes
    pub size: u64,
}

/// Port trait for local vault operations
///
/// ## Implementation Notes
///
/// - `list_files` enumerates regular files only; folders are implied by
///   the paths.
/// - `create_folder` is idempotent: creating an existing folder succeeds.
/// - `get_file` returns `Ok(None)` for a missing path rather than an error.
#[async_trait::async_trait]
pub trait IVaultStore: Send + Sync {
    /// Enumerates every file in the vault
    async fn list_files(&self) -> anyhow::Result<Vec<VaultFile>>;

    /// Looks up a single file by path
    ///
    /// # Returns
    /// `Ok(None)` if no file exists at the path
    async fn get_file(&self, path: &VaultPath) -> anyhow::Result<Option<VaultFile>>;

    /// Reads the entire contents of a file as UTF-8 text
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, cannot be read, or is
    /// not valid UTF-8
    async fn read_text(&self, path: &VaultPath) -> anyhow::Result<String>;

    /// Reads the entire contents of a file as raw bytes
    async fn read_bytes(&self, path: &VaultPath) -> anyhow::Result<Vec<u8>>;

    /// Writes data to a file, creating it if necessary
    ///
    /// If the file already exists, its contents are replaced. Parent
    /// folders are NOT automatically created; use [`create_folder`] first.
    ///
    /// # Arguments
    /// * `path` - Vault-relative path to write
    /// * `data` - The content to write
    /// * `mtime_ms` - When `Some`, stamp the file's modification time to
    ///   this epoch-millisecond instant after writing
    ///
    /// [`create_folder`]: IVaultStore::create_folder
    async fn write_file(
        &self,
        path: &VaultPath,
        data: &[u8],
        mtime_ms: Option<i64>,
    ) -> anyhow::Result<()>;

    /// Creates a folder and all parent folders as needed
    ///
    /// This is equivalent to `mkdir -p`: an existing folder is a success.
    async fn create_folder(&self, path: &VaultPath) -> anyhow::Result<()>;

    /// Deletes a file from the vault
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be deleted
    async fn delete_file(&self, path: &VaultPath) -> anyhow::Result<()>;
}
