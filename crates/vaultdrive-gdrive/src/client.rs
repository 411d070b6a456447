//! Drive API HTTP client
//!
//! A thin typed wrapper over `reqwest` that knows the two Drive base URLs
//! (the metadata/content API and the upload API), attaches bearer tokens,
//! and classifies non-success responses.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reqwest::Method;
//! use vaultdrive_core::ports::remote_store::AccessToken;
//! use vaultdrive_gdrive::client::DriveClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new();
//! let token = AccessToken::new("access-token-here".to_string());
//! let response = client.request(Method::GET, "/files", &token).send().await?;
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response};

use vaultdrive_core::ports::remote_store::AccessToken;

use crate::DriveError;

/// Base URL for Drive API metadata and content calls
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive API multipart upload calls
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// HTTP client for Drive API calls
///
/// Holds no credential state: every request takes the bearer token
/// explicitly, matching the remote-store port. Both base URLs are
/// injectable for tests.
#[derive(Debug, Clone)]
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata and content requests
    api_base: String,
    /// Base URL for multipart upload requests
    upload_base: String,
}

impl DriveClient {
    /// Creates a client against the production Drive endpoints
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_urls(DRIVE_API_BASE, DRIVE_UPLOAD_BASE)
    }

    /// Creates a client with custom base URLs (useful for testing)
    ///
    /// # Arguments
    /// * `api_base` - Base URL for metadata/content requests
    /// * `upload_base` - Base URL for multipart upload requests
    #[must_use]
    pub fn with_base_urls(api_base: impl Into<String>, upload_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        }
    }

    /// Creates an authorized request builder against the metadata/content API
    ///
    /// Prepends the API base URL and adds the Authorization header.
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/files")
    /// * `token` - Bearer token authorizing the call
    pub fn request(&self, method: Method, path: &str, token: &AccessToken) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        self.client.request(method, &url).bearer_auth(token.secret())
    }

    /// Creates an authorized request builder against the upload API
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the upload base URL
    /// * `token` - Bearer token authorizing the call
    pub fn upload_request(
        &self,
        method: Method,
        path: &str,
        token: &AccessToken,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base, path);
        self.client.request(method, &url).bearer_auth(token.secret())
    }

    /// Returns the metadata/content base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the upload base URL
    pub fn upload_base(&self) -> &str {
        &self.upload_base
    }
}

impl Default for DriveClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Passes a successful response through, classifying anything else
///
/// Reads the body of a failed response into the error so callers can log
/// what the API actually said.
pub(crate) async fn check_success(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DriveError::from_status(status, body))
}
