//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures for paths, identifiers, and settings.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid vault-relative path format or content
    #[error("Invalid vault path: {0}")]
    InvalidVaultPath(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Settings are missing a value required to start a sync
    #[error("Incomplete settings: {0}")]
    IncompleteSettings(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
