//! Remote store port (driven/secondary port)
//!
//! This module defines the interface to the remote object store's HTTP
//! API: folder search/create, paginated listing, multipart upload, content
//! download/export, and deletion.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because transport errors are adapter-specific;
//!   engines classify them into the sync taxonomy at the item boundary.
//! - Every call takes the bearer [`AccessToken`] explicitly. A session
//!   obtains its token once up front, so the adapter holds no mutable
//!   credential state.
//! - `list_children` returns one page per call; the caller follows
//!   `next_page_token` until exhausted.

use chrono::{DateTime, Utc};

use crate::domain::newtypes::RemoteId;

/// MIME type of a remote folder node
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME prefix marking editor-native objects with no raw binary form
pub const EDITOR_NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// A bearer access token authorizing remote calls
///
/// Deliberately has no `Display` impl so the secret does not end up in
/// logs; adapters reach the raw value through [`AccessToken::secret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw bearer token value
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the raw token value for request authorization
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// A remote file or folder as returned by a listing call
///
/// This is a port-level DTO; engines map it onto sync-record state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObjectMetadata {
    /// Remote object id
    pub id: RemoteId,
    /// Object name (one path segment, not a full path)
    pub name: String,
    /// MIME type reported by the store
    pub mime_type: String,
    /// Size in bytes, when the store reports one
    pub size: Option<u64>,
    /// Creation time, when the store reports one
    pub created_time: Option<DateTime<Utc>>,
    /// Last modification time, when the store reports one
    pub modified_time: Option<DateTime<Utc>>,
}

impl RemoteObjectMetadata {
    /// Returns true if this object is a folder
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Returns true if this object is editor-native (export-only)
    ///
    /// Editor-native objects have no raw binary form; content must be
    /// fetched through the export path, never through media download.
    #[must_use]
    pub fn is_editor_native(&self) -> bool {
        self.mime_type.starts_with(EDITOR_NATIVE_MIME_PREFIX) && !self.is_folder()
    }

    /// Returns the modification time as epoch milliseconds, if reported
    #[must_use]
    pub fn modified_ms(&self) -> Option<i64> {
        self.modified_time.map(|t| t.timestamp_millis())
    }
}

/// One page of a folder listing
#[derive(Debug, Clone, Default)]
pub struct RemotePage {
    /// The children on this page (files and folders mixed)
    pub files: Vec<RemoteObjectMetadata>,
    /// Token for the next page; `None` on the last page
    pub next_page_token: Option<String>,
}

/// Port trait for remote object store operations
///
/// ## Implementation Notes
///
/// - `find_folder` must restrict the search to non-trashed folders
///   directly under the given parent.
/// - `upload_new` carries the parent folder id in its metadata;
///   `upload_existing` must NOT, so the object is never re-parented by an
///   update.
/// - `export_text` is for editor-native objects only; implementations
///   export to a textual form (markdown).
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Searches for a non-trashed folder named `name` directly under a parent
    ///
    /// # Returns
    /// The folder's id, or `None` if no such folder exists
    async fn find_folder(
        &self,
        token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
    ) -> anyhow::Result<Option<RemoteId>>;

    /// Creates a folder named `name` under a parent
    async fn create_folder(
        &self,
        token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
    ) -> anyhow::Result<RemoteId>;

    /// Fetches one page of a folder's non-trashed children
    ///
    /// # Arguments
    /// * `folder_id` - The folder whose children to list
    /// * `page_token` - Continuation token from the previous page, if any
    async fn list_children(
        &self,
        token: &AccessToken,
        folder_id: &RemoteId,
        page_token: Option<&str>,
    ) -> anyhow::Result<RemotePage>;

    /// Uploads a new file under a parent folder
    ///
    /// # Returns
    /// The id of the created object
    async fn upload_new(
        &self,
        token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> anyhow::Result<RemoteId>;

    /// Replaces the content (and name metadata) of an existing file
    ///
    /// The upload metadata carries no parent, so the object stays where
    /// it is.
    async fn upload_existing(
        &self,
        token: &AccessToken,
        file_id: &RemoteId,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> anyhow::Result<RemoteId>;

    /// Downloads a file's raw content
    async fn download(&self, token: &AccessToken, file_id: &RemoteId)
        -> anyhow::Result<Vec<u8>>;

    /// Exports an editor-native object as markdown text
    async fn export_text(
        &self,
        token: &AccessToken,
        file_id: &RemoteId,
    ) -> anyhow::Result<String>;

    /// Deletes a remote object by id
    async fn delete(&self, token: &AccessToken, file_id: &RemoteId) -> anyhow::Result<()>;
}
