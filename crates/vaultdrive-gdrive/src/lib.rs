//! Vaultdrive Drive adapter - remote store over HTTP
//!
//! Implements the remote-store and token-manager ports against a
//! Drive-v3-style HTTP API:
//! - Folder search/create and paginated children listing
//! - Multipart upload (POST insert / PATCH replace), raw media download,
//!   markdown export for editor-native objects, deletion
//! - OAuth refresh-token exchange with credentials persisted through the
//!   settings store
//!
//! ## Modules
//!
//! - [`auth`] - Token refresh exchange and the expiry watch channel
//! - [`client`] - HTTP client with injectable base URLs
//! - [`dto`] - Wire request/response types and metadata conversion
//! - [`files`] - Folder search/create, listing, deletion
//! - [`upload`] - Content transfer operations
//! - [`provider`] - The `IRemoteStore` implementation

pub mod auth;
pub mod client;
pub mod dto;
pub mod files;
pub mod provider;
pub mod upload;

use thiserror::Error;

/// Errors surfaced by the Drive HTTP adapter
///
/// These classify what the API reported; callers attach the operation
/// context (`anyhow::Context`) on top.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The bearer token was rejected (401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permission for the requested operation (403)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested object does not exist (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// A server-side failure (5xx)
    #[error("server error {status}: {body}")]
    Server {
        /// The HTTP status code
        status: u16,
        /// The response body, as far as it could be read
        body: String,
    },

    /// Any other non-success status
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// The HTTP status code
        status: u16,
        /// The response body, as far as it could be read
        body: String,
    },

    /// The API answered with a payload the adapter cannot use
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl DriveError {
    /// Classifies a non-success HTTP status with its response body
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => DriveError::Unauthorized(body),
            403 => DriveError::Forbidden(body),
            404 => DriveError::NotFound(body),
            s if (500..600).contains(&s) => DriveError::Server { status: s, body },
            s => DriveError::UnexpectedStatus { status: s, body },
        }
    }
}
