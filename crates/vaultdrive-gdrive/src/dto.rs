//! Wire types for the Drive API
//!
//! Response DTOs deserialize the camelCase listing and upload payloads;
//! request DTOs serialize folder-create and upload metadata. Listing
//! sizes arrive as decimal strings and timestamps as RFC 3339; both are
//! converted here into the port-level metadata type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vaultdrive_core::domain::newtypes::RemoteId;
use vaultdrive_core::ports::remote_store::RemoteObjectMetadata;

use crate::DriveError;

/// Fallback MIME type when a listing entry carries none
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

// ============================================================================
// Response types
// ============================================================================

/// A file or folder in a Drive API response
///
/// Fields beyond `id` and `name` use `Option` because the API only
/// returns what the request's `fields` selector asked for, and folders
/// carry no `size`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Remote object id
    pub id: String,
    /// Object name (a single path segment, not a full path)
    pub name: String,
    /// MIME type; folders carry the folder MIME type
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Size in bytes as a decimal string
    #[serde(default)]
    pub size: Option<String>,
    /// Creation timestamp in RFC 3339 format
    #[serde(default)]
    pub created_time: Option<String>,
    /// Last modification timestamp in RFC 3339 format
    #[serde(default)]
    pub modified_time: Option<String>,
}

/// One page of a files.list response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    /// The entries on this page
    #[serde(default)]
    pub files: Vec<DriveFile>,
    /// Continuation token; absent on the last page
    pub next_page_token: Option<String>,
}

// ============================================================================
// Request types
// ============================================================================

/// Request body for folder creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCreateRequest<'a> {
    /// The new folder's name
    pub name: &'a str,
    /// Always the folder MIME type
    pub mime_type: &'a str,
    /// The single parent the folder is created under
    pub parents: Vec<&'a str>,
}

/// Metadata part of a multipart upload
///
/// `parents` is set only on insert; a replace must not carry it so the
/// object is never re-parented by an update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata<'a> {
    /// The object's name
    pub name: &'a str,
    /// Parent folder for an insert; omitted entirely for a replace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<&'a str>>,
}

// ============================================================================
// Conversions
// ============================================================================

/// Validates a raw wire id into a [`RemoteId`]
pub(crate) fn parse_remote_id(raw: String) -> Result<RemoteId, DriveError> {
    RemoteId::new(raw).map_err(|e| DriveError::InvalidResponse(format!("unusable object id: {e}")))
}

/// Converts a wire [`DriveFile`] into the port-level metadata type
///
/// The decimal-string size and RFC 3339 timestamps are parsed here; a
/// value that fails to parse becomes `None` rather than an error, since
/// neither is required to identify the object.
///
/// # Errors
/// Returns [`DriveError::InvalidResponse`] when the id is unusable.
pub fn drive_file_to_metadata(file: DriveFile) -> Result<RemoteObjectMetadata, DriveError> {
    let id = parse_remote_id(file.id)?;

    Ok(RemoteObjectMetadata {
        id,
        name: file.name,
        mime_type: file
            .mime_type
            .unwrap_or_else(|| UNKNOWN_MIME_TYPE.to_string()),
        size: file.size.as_deref().and_then(|s| s.parse::<u64>().ok()),
        created_time: parse_rfc3339(file.created_time.as_deref()),
        modified_time: parse_rfc3339(file.modified_time.as_deref()),
    })
}

/// Parses an optional RFC 3339 timestamp, dropping unparseable values
fn parse_rfc3339(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|s| s.parse::<DateTime<Utc>>().ok())
}
