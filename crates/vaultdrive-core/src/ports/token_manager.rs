//! Token manager port (driven/secondary port)
//!
//! A sync invocation calls [`ITokenManager::ensure_valid`] exactly once,
//! before any remote call. The implementation refreshes expired
//! credentials, persists them, and hands back a usable bearer token.

use crate::domain::sync_error::SyncError;

use super::remote_store::AccessToken;

/// Port trait for obtaining a valid bearer token
///
/// ## Implementation Notes
///
/// - The only error this can produce is [`SyncError::Auth`]; a failed
///   refresh aborts the whole sync (fatal, not per-item).
/// - Implementations must persist refreshed credentials *before*
///   returning, so a crash mid-session never loses a rotated refresh
///   token.
#[async_trait::async_trait]
pub trait ITokenManager: Send + Sync {
    /// Returns a non-expired access token, refreshing first if needed
    async fn ensure_valid(&self) -> Result<AccessToken, SyncError>;
}
