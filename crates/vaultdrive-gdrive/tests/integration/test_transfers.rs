//! Upload, download, and export transfer tests

use serde_json::json;
use vaultdrive_core::domain::newtypes::RemoteId;
use vaultdrive_core::ports::remote_store::IRemoteStore;
use vaultdrive_gdrive::provider::DriveRemoteStore;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{setup_drive_mock, test_token};

fn remote_id(raw: &str) -> RemoteId {
    RemoteId::new(raw.to_string()).unwrap()
}

#[tokio::test]
async fn test_upload_new_sends_multipart_with_parent() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header(
            "Content-Type",
            "multipart/related; boundary=vaultdrive_multipart_boundary",
        ))
        .and(body_string_contains("--vaultdrive_multipart_boundary"))
        .and(body_string_contains(r#""name":"a.md""#))
        .and(body_string_contains(r#""parents":["folder-1"]"#))
        .and(body_string_contains("Content-Type: text/markdown"))
        .and(body_string_contains("# Hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-77", "name": "a.md"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = store
        .upload_new(
            &test_token(),
            &remote_id("folder-1"),
            "a.md",
            "text/markdown",
            b"# Hello",
        )
        .await
        .unwrap();

    assert_eq!(id, remote_id("file-77"));
}

#[tokio::test]
async fn test_upload_existing_patches_without_reparenting() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("PATCH"))
        .and(path("/files/file-9"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains(r#""name":"a.md""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-9", "name": "a.md"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = store
        .upload_existing(
            &test_token(),
            &remote_id("file-9"),
            "a.md",
            "text/markdown",
            b"updated body",
        )
        .await
        .unwrap();
    assert_eq!(id, remote_id("file-9"));

    // The replace metadata must not carry a parents field, otherwise the
    // object would be re-parented under its own folder on every update.
    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.as_str() == "PATCH")
        .unwrap();
    let body = String::from_utf8(patch.body.clone()).unwrap();
    assert!(!body.contains("parents"), "replace body re-parents: {body}");
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    let content: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a];
    Mock::given(method("GET"))
        .and(path("/files/file-img"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .mount(&server)
        .await;

    let downloaded = store
        .download(&test_token(), &remote_id("file-img"))
        .await
        .unwrap();

    assert_eq!(downloaded, content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files/file-empty"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::new()))
        .mount(&server)
        .await;

    let downloaded = store
        .download(&test_token(), &remote_id("file-empty"))
        .await
        .unwrap();

    assert!(downloaded.is_empty());
}

#[tokio::test]
async fn test_export_returns_markdown_text() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files/doc-1/export"))
        .and(query_param("mimeType", "text/markdown"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Exported\n\nBody text.\n"))
        .mount(&server)
        .await;

    let text = store
        .export_text(&test_token(), &remote_id("doc-1"))
        .await
        .unwrap();

    assert_eq!(text, "# Exported\n\nBody text.\n");
}

#[tokio::test]
async fn test_upload_server_error_propagates() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(503).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let result = store
        .upload_new(
            &test_token(),
            &remote_id("folder-1"),
            "a.md",
            "text/markdown",
            b"# Hello",
        )
        .await;

    let err = format!("{:#}", result.unwrap_err());
    assert!(err.contains("upload of 'a.md' failed"), "unexpected error: {err}");
    assert!(err.contains("503"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_download_missing_file_errors() {
    let (server, client) = setup_drive_mock().await;
    let store = DriveRemoteStore::with_client(client);

    Mock::given(method("GET"))
        .and(path("/files/file-gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("File not found"))
        .mount(&server)
        .await;

    let result = store.download(&test_token(), &remote_id("file-gone")).await;
    assert!(result.is_err());
}
