//! Folder search/create, listing pagination, and deletion tests

use serde_json::json;
use vaultdrive_core::domain::newtypes::RemoteId;
use vaultdrive_core::ports::remote_store::IRemoteStore;
use vaultdrive_gdrive::provider::DriveRemoteStore;
use wiremock::matchers::{bearer_token, method, path, query_param, query_param_contains};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{setup_drive_mock, test_token};

fn remote_id(raw: &str) -> RemoteId {
    RemoteId::new(raw.to_string()).unwrap()
}

#[tokio::test]
async fn test_find_folder_returns_match() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(bearer_token("test-access-token"))
        .and(query_param_contains("q", "name='notes'"))
        .and(query_param_contains("q", "'root-1' in parents"))
        .and(query_param_contains("q", "trashed=false"))
        .and(query_param("fields", "files(id,name)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "folder-123", "name": "notes"}]
        })))
        .mount(&server)
        .await;

    let found = store
        .find_folder(&test_token(), &remote_id("root-1"), "notes")
        .await
        .unwrap();

    assert_eq!(found, Some(remote_id("folder-123")));
}

#[tokio::test]
async fn test_find_folder_returns_none_when_absent() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .mount(&server)
        .await;

    let found = store
        .find_folder(&test_token(), &remote_id("root-1"), "missing")
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_find_folder_escapes_quotes_in_name() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param_contains("q", "name='it\\'s'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "folder-q", "name": "it's"}]
        })))
        .mount(&server)
        .await;

    let found = store
        .find_folder(&test_token(), &remote_id("root-1"), "it's")
        .await
        .unwrap();

    assert_eq!(found, Some(remote_id("folder-q")));
}

#[tokio::test]
async fn test_create_folder_posts_metadata() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(wiremock::matchers::body_partial_json(json!({
            "name": "daily",
            "mimeType": "application/vnd.google-apps.folder",
            "parents": ["root-1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "folder-new", "name": "daily"
        })))
        .mount(&server)
        .await;

    let created = store
        .create_folder(&test_token(), &remote_id("root-1"), "daily")
        .await
        .unwrap();

    assert_eq!(created, remote_id("folder-new"));
}

#[tokio::test]
async fn test_list_children_maps_metadata() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param_contains("q", "'folder-1' in parents"))
        .and(query_param("pageSize", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                {
                    "id": "file-1",
                    "name": "a.md",
                    "mimeType": "text/markdown",
                    "size": "2048",
                    "createdTime": "2026-01-10T08:00:00.000Z",
                    "modifiedTime": "2026-01-12T09:30:00.000Z"
                },
                {
                    "id": "sub-1",
                    "name": "attachments",
                    "mimeType": "application/vnd.google-apps.folder"
                }
            ]
        })))
        .mount(&server)
        .await;

    let page = store
        .list_children(&test_token(), &remote_id("folder-1"), None)
        .await
        .unwrap();

    assert!(page.next_page_token.is_none());
    assert_eq!(page.files.len(), 2);

    let file = &page.files[0];
    assert_eq!(file.id, remote_id("file-1"));
    assert_eq!(file.name, "a.md");
    assert_eq!(file.size, Some(2048));
    assert!(!file.is_folder());
    assert_eq!(
        file.modified_time.unwrap().to_rfc3339(),
        "2026-01-12T09:30:00+00:00"
    );

    let folder = &page.files[1];
    assert!(folder.is_folder());
    assert!(folder.size.is_none());
}

#[tokio::test]
async fn test_list_children_follows_page_token() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    // First page: no pageToken parameter, answers once with a continuation
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "file-1", "name": "a.md", "mimeType": "text/markdown"}],
            "nextPageToken": "tok-2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Second page: only matched when the continuation token is sent back
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("pageToken", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "file-2", "name": "b.md", "mimeType": "text/markdown"}]
        })))
        .mount(&server)
        .await;

    let token = test_token();
    let folder = remote_id("folder-1");

    let first = store.list_children(&token, &folder, None).await.unwrap();
    assert_eq!(first.next_page_token.as_deref(), Some("tok-2"));
    assert_eq!(first.files[0].id, remote_id("file-1"));

    let second = store
        .list_children(&token, &folder, first.next_page_token.as_deref())
        .await
        .unwrap();
    assert!(second.next_page_token.is_none());
    assert_eq!(second.files[0].id, remote_id("file-2"));
}

#[tokio::test]
async fn test_list_children_server_error_propagates() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let result = store
        .list_children(&test_token(), &remote_id("folder-1"), None)
        .await;

    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("500"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_delete_removes_remote_object() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("DELETE"))
        .and(path("/files/file-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store
        .delete(&test_token(), &remote_id("file-9"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_object_errors() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("DELETE"))
        .and(path("/files/file-gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("File not found"))
        .mount(&server)
        .await;

    let result = store.delete(&test_token(), &remote_id("file-gone")).await;
    assert!(result.is_err());
}
