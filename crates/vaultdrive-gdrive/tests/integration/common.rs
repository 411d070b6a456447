//! Shared helpers for integration tests

use vaultdrive_core::ports::AccessToken;
use vaultdrive_gdrive::client::DriveClient;
use wiremock::MockServer;

/// Starts a mock server and returns a [`DriveClient`] whose API and
/// upload base URLs both point at it.
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_urls(server.uri(), server.uri());
    (server, client)
}

/// A bearer token used across the Drive API tests.
pub fn test_token() -> AccessToken {
    AccessToken::new("test-access-token".to_string())
}
