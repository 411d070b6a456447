//! Vaultdrive Sync - Bidirectional sync engine
//!
//! Orchestrates synchronization between a local vault and its remote
//! mirror folder, in both directions, on top of the ports defined in
//! `vaultdrive-core`.
//!
//! ## Sync Flow
//!
//! ```text
//! token (ITokenManager) ──→ mirror folder (resolver) ──→ enumerate
//!      ──→ change detection ──→ batched transfers ──→ deletion sweep
//!      ──→ commit record + last-sync timestamp
//! ```
//!
//! Push enumerates the local vault and upserts remote objects; pull
//! traverses the remote mirror tree and upserts local files. Both end
//! with a deletion sweep reconciling entries present on only one side,
//! and both fan work out through the batch scheduler in capped groups.
//!
//! ## Modules
//!
//! - [`push`] - Local→remote engine (upload + remote deletion sweep)
//! - [`pull`] - Remote→local engine (traversal, download + local sweep)
//! - [`detector`] - Mtime-based change detection predicates
//! - [`batch`] - Bounded-concurrency group scheduler
//! - [`resolver`] - Memoized remote folder path resolution
//! - [`mime`] - Extension→MIME table and textual-extension set
//! - [`vault`] - `tokio::fs` vault adapter implementing `IVaultStore`

pub mod batch;
pub mod detector;
pub mod mime;
pub mod pull;
pub mod push;
pub mod resolver;
pub mod vault;

#[cfg(test)]
pub(crate) mod fakes;

pub use pull::PullEngine;
pub use push::PushEngine;
pub use vault::VaultStoreAdapter;
