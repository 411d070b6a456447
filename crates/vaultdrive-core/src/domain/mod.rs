//! Domain entities and business logic
//!
//! This module contains the core domain types for Vaultdrive:
//! - Newtypes for type-safe identifiers and validated paths
//! - Credential state owned by the token manager
//! - The persisted sync record and its in-session store
//! - Session, per-item outcome, and report types
//! - The sync failure taxonomy

pub mod credentials;
pub mod errors;
pub mod newtypes;
pub mod record;
pub mod session;
pub mod sync_error;

// Re-export commonly used types
pub use credentials::Credentials;
pub use errors::DomainError;
pub use newtypes::{RemoteId, SessionId, VaultPath};
pub use record::{SyncRecord, SyncRecordStore, VaultFileRecord};
pub use session::{ItemOutcome, SyncDirection, SyncReport, SyncSession};
pub use sync_error::{SyncError, TransferOp};
