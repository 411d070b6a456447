//! Mtime-based change detection
//!
//! Decides, per file, whether content needs to cross the boundary or the
//! item can be skipped. The two directions use deliberately different
//! conditions:
//!
//! - **Push** skips when `record.last_modified >= local mtime`: the
//!   record timestamp was taken from the local mtime at upload time, so
//!   equality means "unchanged since last upload".
//! - **Pull** skips only when a local counterpart exists, the record
//!   points at the *same* remote object, and `local mtime >= remote
//!   modified time`. Without the identity match the remote object is a
//!   different file that happens to share the path, and it wins.
//!
//! The boundary asymmetry (strict `<` on push, identity-gated `>=` on
//! pull) decides whether an untouched file is re-transferred on every
//! run; both conditions must stay exactly as they are.

use vaultdrive_core::domain::record::VaultFileRecord;
use vaultdrive_core::ports::remote_store::RemoteObjectMetadata;
use vaultdrive_core::ports::vault_store::VaultFile;

/// Returns true if a local file needs uploading
///
/// A path with no record entry has never been synced and always
/// transfers.
#[must_use]
pub fn should_push(record: Option<&VaultFileRecord>, local_mtime_ms: i64) -> bool {
    match record {
        Some(entry) => entry.last_modified < local_mtime_ms,
        None => true,
    }
}

/// Returns true if a remote file needs downloading
///
/// Skips only when all three hold: a local counterpart exists, the
/// record's remote id matches the discovered object, and the local mtime
/// is at least the remote modification time. A remote object without a
/// reported modification time always transfers.
#[must_use]
pub fn should_pull(
    record: Option<&VaultFileRecord>,
    local: Option<&VaultFile>,
    remote: &RemoteObjectMetadata,
) -> bool {
    let (Some(entry), Some(local)) = (record, local) else {
        return true;
    };

    if entry.remote_id != remote.id {
        return true;
    }

    match remote.modified_ms() {
        Some(remote_mtime_ms) => local.mtime_ms < remote_mtime_ms,
        None => true,
    }
}
