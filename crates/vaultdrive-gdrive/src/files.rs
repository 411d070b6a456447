//! Folder search/create, children listing, and deletion
//!
//! Each function here is exactly one HTTP call; the pagination loop over
//! `next_page_token` and the search-or-create decision live with the
//! callers (the resolver and the pull traversal).

use anyhow::{Context, Result};
use reqwest::Method;
use tracing::{debug, info};

use vaultdrive_core::domain::newtypes::RemoteId;
use vaultdrive_core::ports::remote_store::{AccessToken, RemotePage, FOLDER_MIME_TYPE};

use crate::client::{check_success, DriveClient};
use crate::dto::{drive_file_to_metadata, parse_remote_id, DriveFile, DriveFileList, FolderCreateRequest};

/// Fields requested from children listing calls
const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,size,createdTime,modifiedTime)";

/// Entries fetched per listing page
const PAGE_SIZE: &str = "1000";

/// Escapes a value for embedding between single quotes in a Drive query
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Searches for a non-trashed folder named `name` directly under a parent
///
/// # Returns
/// The folder's id, or `None` if no such folder exists
pub async fn find_folder(
    client: &DriveClient,
    token: &AccessToken,
    parent_id: &RemoteId,
    name: &str,
) -> Result<Option<RemoteId>> {
    let query = format!(
        "name='{}' and '{}' in parents and mimeType='{}' and trashed=false",
        escape_query_value(name),
        parent_id.as_str(),
        FOLDER_MIME_TYPE
    );
    debug!(parent = %parent_id, name, "Searching for remote folder");

    let response = client
        .request(Method::GET, "/files", token)
        .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
        .send()
        .await
        .context("failed to send folder search request")?;
    let response = check_success(response)
        .await
        .with_context(|| format!("folder search for '{name}' failed"))?;

    let list: DriveFileList = response
        .json()
        .await
        .context("failed to parse folder search response")?;

    match list.files.into_iter().next() {
        Some(folder) => {
            let id = parse_remote_id(folder.id)?;
            debug!(folder = %id, name, "Found existing remote folder");
            Ok(Some(id))
        }
        None => Ok(None),
    }
}

/// Creates a folder named `name` under a parent
///
/// # Returns
/// The id of the created folder
pub async fn create_folder(
    client: &DriveClient,
    token: &AccessToken,
    parent_id: &RemoteId,
    name: &str,
) -> Result<RemoteId> {
    let body = FolderCreateRequest {
        name,
        mime_type: FOLDER_MIME_TYPE,
        parents: vec![parent_id.as_str()],
    };

    let response = client
        .request(Method::POST, "/files", token)
        .json(&body)
        .send()
        .await
        .context("failed to send folder create request")?;
    let response = check_success(response)
        .await
        .with_context(|| format!("folder create for '{name}' failed"))?;

    let created: DriveFile = response
        .json()
        .await
        .context("failed to parse folder create response")?;
    let id = parse_remote_id(created.id)?;

    info!(folder = %id, name, parent = %parent_id, "Created remote folder");
    Ok(id)
}

/// Fetches one page of a folder's non-trashed children
///
/// The server-side query already excludes trashed entries, so every
/// returned child is live.
///
/// # Arguments
/// * `folder_id` - The folder whose children to list
/// * `page_token` - Continuation token from the previous page, if any
pub async fn list_children(
    client: &DriveClient,
    token: &AccessToken,
    folder_id: &RemoteId,
    page_token: Option<&str>,
) -> Result<RemotePage> {
    let query = format!("'{}' in parents and trashed=false", folder_id.as_str());
    let mut params = vec![
        ("q", query.as_str()),
        ("fields", LIST_FIELDS),
        ("pageSize", PAGE_SIZE),
    ];
    if let Some(next) = page_token {
        params.push(("pageToken", next));
    }
    debug!(folder = %folder_id, continuation = page_token.is_some(), "Listing folder children");

    let response = client
        .request(Method::GET, "/files", token)
        .query(&params)
        .send()
        .await
        .context("failed to send listing request")?;
    let response = check_success(response)
        .await
        .with_context(|| format!("listing of '{folder_id}' failed"))?;

    let list: DriveFileList = response
        .json()
        .await
        .context("failed to parse listing response")?;

    let files = list
        .files
        .into_iter()
        .map(drive_file_to_metadata)
        .collect::<Result<Vec<_>, _>>()
        .context("listing response carried an unusable entry")?;

    debug!(
        folder = %folder_id,
        count = files.len(),
        has_next = list.next_page_token.is_some(),
        "Fetched listing page"
    );

    Ok(RemotePage {
        files,
        next_page_token: list.next_page_token,
    })
}

/// Deletes a remote object by id
pub async fn delete_file(
    client: &DriveClient,
    token: &AccessToken,
    file_id: &RemoteId,
) -> Result<()> {
    let path = format!("/files/{}", file_id.as_str());

    let response = client
        .request(Method::DELETE, &path, token)
        .send()
        .await
        .context("failed to send delete request")?;
    check_success(response)
        .await
        .with_context(|| format!("delete of '{file_id}' failed"))?;

    debug!(file = %file_id, "Deleted remote object");
    Ok(())
}
