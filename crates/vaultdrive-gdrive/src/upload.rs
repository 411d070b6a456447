//! Content transfer operations
//!
//! Multipart uploads (insert and replace), raw media download, and the
//! markdown export path for editor-native objects.
//!
//! ## Multipart format
//!
//! Uploads use a `multipart/related` body with two parts: a JSON
//! metadata part, then the content part with the file's own MIME type.
//! An insert's metadata carries the parent folder id; a replace's
//! metadata carries only the name, so the object is never re-parented.

use anyhow::{Context, Result};
use reqwest::Method;
use tracing::debug;

use vaultdrive_core::domain::newtypes::RemoteId;
use vaultdrive_core::ports::remote_store::AccessToken;

use crate::client::{check_success, DriveClient};
use crate::dto::{parse_remote_id, DriveFile, UploadMetadata};

/// Boundary separating the metadata and content parts of an upload body
const MULTIPART_BOUNDARY: &str = "vaultdrive_multipart_boundary";

/// Assembles a `multipart/related` body from metadata JSON and content
fn multipart_related_body(metadata_json: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let head = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata_json}\r\n\
         --{MULTIPART_BOUNDARY}\r\n\
         Content-Type: {content_type}\r\n\r\n"
    );

    let mut body = head.into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--").as_bytes());
    body
}

/// Value of the Content-Type header for multipart uploads
fn multipart_content_type() -> String {
    format!("multipart/related; boundary={MULTIPART_BOUNDARY}")
}

/// Uploads a new file under a parent folder
///
/// Issues `POST {uploadBase}/files?uploadType=multipart` with the parent
/// folder id in the metadata part.
///
/// # Returns
/// The id of the created object
pub async fn upload_new(
    client: &DriveClient,
    token: &AccessToken,
    parent_id: &RemoteId,
    name: &str,
    mime_type: &str,
    content: &[u8],
) -> Result<RemoteId> {
    let metadata = UploadMetadata {
        name,
        parents: Some(vec![parent_id.as_str()]),
    };
    let metadata_json =
        serde_json::to_string(&metadata).context("failed to serialize upload metadata")?;
    let body = multipart_related_body(&metadata_json, mime_type, content);

    debug!(parent = %parent_id, name, bytes = content.len(), "Uploading new file");

    let response = client
        .upload_request(Method::POST, "/files", token)
        .query(&[("uploadType", "multipart")])
        .header("Content-Type", multipart_content_type())
        .body(body)
        .send()
        .await
        .context("failed to send upload request")?;
    let response = check_success(response)
        .await
        .with_context(|| format!("upload of '{name}' failed"))?;

    let created: DriveFile = response
        .json()
        .await
        .context("failed to parse upload response")?;
    let id = parse_remote_id(created.id)?;

    debug!(file = %id, name, "Uploaded new file");
    Ok(id)
}

/// Replaces the content (and name metadata) of an existing file
///
/// Issues `PATCH {uploadBase}/files/{id}?uploadType=multipart`. The
/// metadata part carries no parent, so the object stays where it is.
///
/// # Returns
/// The id of the updated object
pub async fn upload_existing(
    client: &DriveClient,
    token: &AccessToken,
    file_id: &RemoteId,
    name: &str,
    mime_type: &str,
    content: &[u8],
) -> Result<RemoteId> {
    let metadata = UploadMetadata {
        name,
        parents: None,
    };
    let metadata_json =
        serde_json::to_string(&metadata).context("failed to serialize upload metadata")?;
    let body = multipart_related_body(&metadata_json, mime_type, content);
    let path = format!("/files/{}", file_id.as_str());

    debug!(file = %file_id, name, bytes = content.len(), "Replacing file content");

    let response = client
        .upload_request(Method::PATCH, &path, token)
        .query(&[("uploadType", "multipart")])
        .header("Content-Type", multipart_content_type())
        .body(body)
        .send()
        .await
        .context("failed to send upload request")?;
    let response = check_success(response)
        .await
        .with_context(|| format!("upload of '{name}' failed"))?;

    let updated: DriveFile = response
        .json()
        .await
        .context("failed to parse upload response")?;
    let id = parse_remote_id(updated.id)?;

    debug!(file = %id, name, "Replaced file content");
    Ok(id)
}

/// Downloads a file's raw content
///
/// Issues `GET {base}/files/{id}?alt=media`, which returns the bytes
/// directly.
pub async fn download(
    client: &DriveClient,
    token: &AccessToken,
    file_id: &RemoteId,
) -> Result<Vec<u8>> {
    let path = format!("/files/{}", file_id.as_str());
    debug!(file = %file_id, "Downloading file content");

    let response = client
        .request(Method::GET, &path, token)
        .query(&[("alt", "media")])
        .send()
        .await
        .context("failed to send download request")?;
    let response = check_success(response)
        .await
        .with_context(|| format!("download of '{file_id}' failed"))?;

    let bytes = response
        .bytes()
        .await
        .context("failed to read download body")?;

    debug!(file = %file_id, bytes = bytes.len(), "Downloaded file content");
    Ok(bytes.to_vec())
}

/// Exports an editor-native object as markdown text
///
/// Issues `GET {base}/files/{id}/export?mimeType=text/markdown`. Only
/// valid for editor-native objects; regular files go through
/// [`download`].
pub async fn export_markdown(
    client: &DriveClient,
    token: &AccessToken,
    file_id: &RemoteId,
) -> Result<String> {
    let path = format!("/files/{}/export", file_id.as_str());
    debug!(file = %file_id, "Exporting editor-native object as markdown");

    let response = client
        .request(Method::GET, &path, token)
        .query(&[("mimeType", "text/markdown")])
        .send()
        .await
        .context("failed to send export request")?;
    let response = check_success(response)
        .await
        .with_context(|| format!("export of '{file_id}' failed"))?;

    let text = response.text().await.context("failed to read export body")?;

    debug!(file = %file_id, bytes = text.len(), "Exported editor-native object");
    Ok(text)
}
