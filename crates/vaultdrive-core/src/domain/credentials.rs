//! Credential state owned by the token manager
//!
//! [`Credentials`] is the persisted bundle of identity and OAuth tokens.
//! It is read by every sync invocation and mutated only through the
//! refresh exchange; see the `ITokenManager` port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted identity and token state for the drive account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account identity sent along with the refresh exchange
    pub user_id: String,
    /// Bearer token for authenticating API requests
    pub access_token: String,
    /// Token for refreshing the access token without user interaction
    pub refresh_token: String,
    /// When the access token expires
    pub access_expiry: DateTime<Utc>,
}

impl Credentials {
    /// Returns true if the access token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.access_expiry
    }

    /// Returns true if the access token will expire within the given duration
    pub fn expires_within(&self, duration: chrono::Duration) -> bool {
        Utc::now() + duration >= self.access_expiry
    }
}
