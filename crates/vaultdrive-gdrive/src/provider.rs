//! Remote-store port implementation
//!
//! [`DriveRemoteStore`] wires the folder, listing, and transfer
//! operations onto the `IRemoteStore` port. It is a stateless facade
//! over [`DriveClient`]; every call carries its own bearer token.

use anyhow::Result;
use tracing::instrument;

use vaultdrive_core::domain::newtypes::RemoteId;
use vaultdrive_core::ports::remote_store::{AccessToken, IRemoteStore, RemotePage};

use crate::client::DriveClient;
use crate::{files, upload};

/// Drive-backed implementation of the remote-store port
pub struct DriveRemoteStore {
    client: DriveClient,
}

impl DriveRemoteStore {
    /// Creates a store against the production Drive endpoints
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: DriveClient::new(),
        }
    }

    /// Creates a store over a preconfigured client (custom base URLs)
    #[must_use]
    pub fn with_client(client: DriveClient) -> Self {
        Self { client }
    }
}

impl Default for DriveRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DriveRemoteStore {
    #[instrument(skip(self, token))]
    async fn find_folder(
        &self,
        token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
    ) -> Result<Option<RemoteId>> {
        files::find_folder(&self.client, token, parent_id, name).await
    }

    #[instrument(skip(self, token))]
    async fn create_folder(
        &self,
        token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
    ) -> Result<RemoteId> {
        files::create_folder(&self.client, token, parent_id, name).await
    }

    #[instrument(skip(self, token))]
    async fn list_children(
        &self,
        token: &AccessToken,
        folder_id: &RemoteId,
        page_token: Option<&str>,
    ) -> Result<RemotePage> {
        files::list_children(&self.client, token, folder_id, page_token).await
    }

    #[instrument(skip(self, token, content))]
    async fn upload_new(
        &self,
        token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> Result<RemoteId> {
        upload::upload_new(&self.client, token, parent_id, name, mime_type, content).await
    }

    #[instrument(skip(self, token, content))]
    async fn upload_existing(
        &self,
        token: &AccessToken,
        file_id: &RemoteId,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> Result<RemoteId> {
        upload::upload_existing(&self.client, token, file_id, name, mime_type, content).await
    }

    #[instrument(skip(self, token))]
    async fn download(&self, token: &AccessToken, file_id: &RemoteId) -> Result<Vec<u8>> {
        upload::download(&self.client, token, file_id).await
    }

    #[instrument(skip(self, token))]
    async fn export_text(&self, token: &AccessToken, file_id: &RemoteId) -> Result<String> {
        upload::export_markdown(&self.client, token, file_id).await
    }

    #[instrument(skip(self, token))]
    async fn delete(&self, token: &AccessToken, file_id: &RemoteId) -> Result<()> {
        files::delete_file(&self.client, token, file_id).await
    }
}
