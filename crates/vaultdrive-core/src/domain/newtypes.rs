//! Domain newtypes for type-safe identifiers and validated values
//!
//! These wrappers make invalid values unrepresentable past construction:
//! a [`VaultPath`] is always a normalized vault-relative path usable as a
//! sync-record key, and a [`RemoteId`] is always a plausible drive object
//! identifier.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// Identifier newtypes
// ============================================================================

/// Identifier for a single sync invocation, used for log correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random SessionId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a SessionId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid SessionId: {e}")))
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// Path and remote-identity newtypes
// ============================================================================

/// A vault-relative file or folder path
///
/// The unique key of the sync record: slash-separated, no leading or
/// trailing slash, e.g. `notes/daily/2024-01-01.md`. Segments may not be
/// empty, `.`, or `..`, and backslashes are rejected outright so keys are
/// identical across platforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultPath(String);

impl VaultPath {
    /// Create a new VaultPath
    ///
    /// # Errors
    /// Returns error if the path is empty, absolute, contains backslashes,
    /// or has an empty / `.` / `..` segment
    pub fn new(path: String) -> Result<Self, DomainError> {
        if path.is_empty() {
            return Err(DomainError::InvalidVaultPath(
                "Vault path cannot be empty".to_string(),
            ));
        }

        if path.starts_with('/') {
            return Err(DomainError::InvalidVaultPath(format!(
                "Vault path must be relative (no leading '/'): {path}"
            )));
        }

        if path.ends_with('/') {
            return Err(DomainError::InvalidVaultPath(format!(
                "Vault path cannot end with '/': {path}"
            )));
        }

        if path.contains('\\') {
            return Err(DomainError::InvalidVaultPath(format!(
                "Vault path must use '/' separators only: {path}"
            )));
        }

        for segment in path.split('/') {
            if segment.is_empty() {
                return Err(DomainError::InvalidVaultPath(format!(
                    "Vault path contains an empty segment: {path}"
                )));
            }
            if segment == "." || segment == ".." {
                return Err(DomainError::InvalidVaultPath(format!(
                    "Vault path contains a traversal segment: {path}"
                )));
            }
        }

        Ok(Self(path))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path segments in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Join a single path component
    ///
    /// # Errors
    /// Returns error if the component is empty or contains a separator
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        Self::new(format!("{}/{component}", self.0))
    }

    /// Get the parent path, or `None` for a top-level entry
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Get the final path segment
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Get the extension of the final segment (without the dot), if any
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }
}

impl Display for VaultPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VaultPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for VaultPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<VaultPath> for String {
    fn from(path: VaultPath) -> Self {
        path.0
    }
}

/// A drive object ID (opaque identifier)
///
/// Format: URL-safe alphanumeric string, e.g. `1xGf3K9v_q2bTm0pZ4RlwYc`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID format is invalid
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        // Drive IDs are URL-safe: alphanumeric plus '-' and '_'
        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

// ============================================================================
// Tests
// ============================================================================
