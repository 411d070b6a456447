//! In-memory fake adapters for engine tests
//!
//! Implement the three ports over plain maps with atomic call counters,
//! switchable failure injection, and an in-flight gauge on the remote
//! transfer operations so tests can observe peak concurrency.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use vaultdrive_core::config::{RemoteFolderRef, SettingsStore, SyncConfig};
use vaultdrive_core::domain::newtypes::{RemoteId, VaultPath};
use vaultdrive_core::domain::sync_error::SyncError;
use vaultdrive_core::ports::remote_store::{
    AccessToken, IRemoteStore, RemoteObjectMetadata, RemotePage, FOLDER_MIME_TYPE,
};
use vaultdrive_core::ports::token_manager::ITokenManager;
use vaultdrive_core::ports::vault_store::{IVaultStore, VaultFile};

// ============================================================================
// Shared test fixtures
// ============================================================================

/// Opens a settings store inside a fresh temp directory
pub(crate) fn temp_settings() -> (TempDir, Arc<SettingsStore>) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SettingsStore::open(dir.path().join("settings.json")).unwrap());
    (dir, store)
}

/// A sync config pointing at the fake root folder `root-0`
pub(crate) fn test_config() -> SyncConfig {
    SyncConfig {
        vault_name: "vault".to_string(),
        root_folder: RemoteFolderRef {
            id: RemoteId::new("root-0".to_string()).unwrap(),
            name: "Vaults".to_string(),
        },
        concurrency_limit: 5,
    }
}

pub(crate) fn vault_path(s: &str) -> VaultPath {
    VaultPath::new(s.to_string()).unwrap()
}

// ============================================================================
// FakeRemoteStore
// ============================================================================

#[derive(Debug, Clone)]
struct RemoteFolder {
    parent: String,
    name: String,
}

#[derive(Debug, Clone)]
struct RemoteFile {
    parent: String,
    name: String,
    mime_type: String,
    content: Vec<u8>,
    modified_ms: i64,
}

/// In-memory remote store with counters and failure injection
pub(crate) struct FakeRemoteStore {
    folders: Mutex<HashMap<String, RemoteFolder>>,
    files: Mutex<BTreeMap<String, RemoteFile>>,
    next_id: AtomicUsize,
    page_size: usize,

    pub find_folder_calls: AtomicUsize,
    pub create_folder_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub upload_new_calls: AtomicUsize,
    pub upload_existing_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub export_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,

    fail_folder_creates: AtomicUsize,
    fail_upload_names: Mutex<HashSet<String>>,
    fail_delete_ids: Mutex<HashSet<String>>,
    fail_list_folders: Mutex<HashSet<String>>,

    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeRemoteStore {
    pub fn new() -> Self {
        Self::with_page_size(usize::MAX)
    }

    /// A store whose listings paginate after `page_size` entries
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            folders: Mutex::new(HashMap::new()),
            files: Mutex::new(BTreeMap::new()),
            next_id: AtomicUsize::new(1),
            page_size,
            find_folder_calls: AtomicUsize::new(0),
            create_folder_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            upload_new_calls: AtomicUsize::new(0),
            upload_existing_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            export_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            fail_folder_creates: AtomicUsize::new(0),
            fail_upload_names: Mutex::new(HashSet::new()),
            fail_delete_ids: Mutex::new(HashSet::new()),
            fail_list_folders: Mutex::new(HashSet::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    // --- Seeding ---

    /// Seeds a detached folder with a fixed id
    pub fn seed_folder(&self, id: &str, name: &str) -> RemoteId {
        self.folders.lock().unwrap().insert(
            id.to_string(),
            RemoteFolder {
                parent: String::new(),
                name: name.to_string(),
            },
        );
        RemoteId::new(id.to_string()).unwrap()
    }

    /// Seeds a folder under a parent, returning its generated id
    pub fn seed_folder_under(&self, parent: &RemoteId, name: &str) -> RemoteId {
        let id = format!("folder-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.folders.lock().unwrap().insert(
            id.clone(),
            RemoteFolder {
                parent: parent.as_str().to_string(),
                name: name.to_string(),
            },
        );
        RemoteId::new(id).unwrap()
    }

    /// Seeds a file under a parent, returning its generated id
    pub fn seed_file(
        &self,
        parent: &RemoteId,
        name: &str,
        mime_type: &str,
        content: &[u8],
        modified_ms: i64,
    ) -> RemoteId {
        let id = format!("file-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.files.lock().unwrap().insert(
            id.clone(),
            RemoteFile {
                parent: parent.as_str().to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                content: content.to_vec(),
                modified_ms,
            },
        );
        RemoteId::new(id).unwrap()
    }

    // --- Failure injection ---

    /// Fails the next `n` folder creates
    pub fn fail_next_folder_creates(&self, n: usize) {
        self.fail_folder_creates.store(n, Ordering::SeqCst);
    }

    /// Fails every upload of a file with this name
    pub fn fail_uploads_named(&self, name: &str) {
        self.fail_upload_names
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    /// Fails every delete of this object
    pub fn fail_delete_of(&self, id: &RemoteId) {
        self.fail_delete_ids
            .lock()
            .unwrap()
            .insert(id.as_str().to_string());
    }

    /// Fails every listing of this folder
    pub fn fail_listing_of(&self, id: &RemoteId) {
        self.fail_list_folders
            .lock()
            .unwrap()
            .insert(id.as_str().to_string());
    }

    // --- Inspection ---

    /// Returns a folder's (parent id, name)
    pub fn parent_of(&self, id: &RemoteId) -> Option<(String, String)> {
        self.folders
            .lock()
            .unwrap()
            .get(id.as_str())
            .map(|f| (f.parent.clone(), f.name.clone()))
    }

    /// Removes a file without going through the port
    pub fn remove_file(&self, id: &RemoteId) {
        self.files.lock().unwrap().remove(id.as_str());
    }

    /// Returns the content of a stored file
    pub fn file_content(&self, id: &RemoteId) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(id.as_str())
            .map(|f| f.content.clone())
    }

    /// Returns the MIME type of a stored file
    pub fn file_mime(&self, id: &RemoteId) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(id.as_str())
            .map(|f| f.mime_type.clone())
    }

    /// Returns the id of the first file with this name
    pub fn file_named(&self, name: &str) -> Option<RemoteId> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|(_, f)| f.name == name)
            .map(|(id, _)| RemoteId::new(id.clone()).unwrap())
    }

    /// Returns the (parent id, name) of a stored file
    pub fn file_location(&self, id: &RemoteId) -> Option<(String, String)> {
        self.files
            .lock()
            .unwrap()
            .get(id.as_str())
            .map(|f| (f.parent.clone(), f.name.clone()))
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    // --- Concurrency gauge ---

    async fn track_start(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }

    fn track_end(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn generate_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait::async_trait]
impl IRemoteStore for FakeRemoteStore {
    async fn find_folder(
        &self,
        _token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
    ) -> anyhow::Result<Option<RemoteId>> {
        self.find_folder_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let found = self
            .folders
            .lock()
            .unwrap()
            .iter()
            .find(|(_, f)| f.parent == parent_id.as_str() && f.name == name)
            .map(|(id, _)| RemoteId::new(id.clone()).unwrap());
        Ok(found)
    }

    async fn create_folder(
        &self,
        _token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
    ) -> anyhow::Result<RemoteId> {
        self.create_folder_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_folder_creates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            anyhow::bail!("injected folder create failure");
        }

        let id = self.generate_id("folder");
        self.folders.lock().unwrap().insert(
            id.clone(),
            RemoteFolder {
                parent: parent_id.as_str().to_string(),
                name: name.to_string(),
            },
        );
        Ok(RemoteId::new(id).unwrap())
    }

    async fn list_children(
        &self,
        _token: &AccessToken,
        folder_id: &RemoteId,
        page_token: Option<&str>,
    ) -> anyhow::Result<RemotePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self
            .fail_list_folders
            .lock()
            .unwrap()
            .contains(folder_id.as_str())
        {
            anyhow::bail!("injected listing failure");
        }

        let mut children: Vec<RemoteObjectMetadata> = Vec::new();
        for (id, folder) in self.folders.lock().unwrap().iter() {
            if folder.parent == folder_id.as_str() {
                children.push(RemoteObjectMetadata {
                    id: RemoteId::new(id.clone()).unwrap(),
                    name: folder.name.clone(),
                    mime_type: FOLDER_MIME_TYPE.to_string(),
                    size: None,
                    created_time: None,
                    modified_time: None,
                });
            }
        }
        for (id, file) in self.files.lock().unwrap().iter() {
            if file.parent == folder_id.as_str() {
                children.push(RemoteObjectMetadata {
                    id: RemoteId::new(id.clone()).unwrap(),
                    name: file.name.clone(),
                    mime_type: file.mime_type.clone(),
                    size: Some(file.content.len() as u64),
                    created_time: None,
                    modified_time: DateTime::from_timestamp_millis(file.modified_ms),
                });
            }
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));

        let offset: usize = page_token.map_or(Ok(0), str::parse)?;
        let end = offset.saturating_add(self.page_size).min(children.len());
        let next_page_token = (end < children.len()).then(|| end.to_string());

        Ok(RemotePage {
            files: children[offset..end].to_vec(),
            next_page_token,
        })
    }

    async fn upload_new(
        &self,
        _token: &AccessToken,
        parent_id: &RemoteId,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> anyhow::Result<RemoteId> {
        self.upload_new_calls.fetch_add(1, Ordering::SeqCst);
        self.track_start().await;

        let result = if self.fail_upload_names.lock().unwrap().contains(name) {
            Err(anyhow::anyhow!("injected upload failure"))
        } else {
            let id = self.generate_id("file");
            self.files.lock().unwrap().insert(
                id.clone(),
                RemoteFile {
                    parent: parent_id.as_str().to_string(),
                    name: name.to_string(),
                    mime_type: mime_type.to_string(),
                    content: content.to_vec(),
                    modified_ms: Utc::now().timestamp_millis(),
                },
            );
            Ok(RemoteId::new(id).unwrap())
        };

        self.track_end();
        result
    }

    async fn upload_existing(
        &self,
        _token: &AccessToken,
        file_id: &RemoteId,
        name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> anyhow::Result<RemoteId> {
        self.upload_existing_calls.fetch_add(1, Ordering::SeqCst);
        self.track_start().await;

        let result = (|| {
            if self.fail_upload_names.lock().unwrap().contains(name) {
                anyhow::bail!("injected upload failure");
            }
            let mut files = self.files.lock().unwrap();
            let file = files
                .get_mut(file_id.as_str())
                .ok_or_else(|| anyhow::anyhow!("no remote file {file_id}"))?;
            file.name = name.to_string();
            file.mime_type = mime_type.to_string();
            file.content = content.to_vec();
            file.modified_ms = Utc::now().timestamp_millis();
            Ok(file_id.clone())
        })();

        self.track_end();
        result
    }

    async fn download(&self, _token: &AccessToken, file_id: &RemoteId) -> anyhow::Result<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.track_start().await;

        let result = self
            .file_content(file_id)
            .ok_or_else(|| anyhow::anyhow!("no remote file {file_id}"));

        self.track_end();
        result
    }

    async fn export_text(&self, _token: &AccessToken, file_id: &RemoteId) -> anyhow::Result<String> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        self.track_start().await;

        let result = self
            .file_content(file_id)
            .ok_or_else(|| anyhow::anyhow!("no remote file {file_id}"))
            .map(|content| String::from_utf8_lossy(&content).into_owned());

        self.track_end();
        result
    }

    async fn delete(&self, _token: &AccessToken, file_id: &RemoteId) -> anyhow::Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.track_start().await;

        let result = (|| {
            if self
                .fail_delete_ids
                .lock()
                .unwrap()
                .contains(file_id.as_str())
            {
                anyhow::bail!("injected delete failure");
            }
            if self.files.lock().unwrap().remove(file_id.as_str()).is_some() {
                return Ok(());
            }
            if self
                .folders
                .lock()
                .unwrap()
                .remove(file_id.as_str())
                .is_some()
            {
                return Ok(());
            }
            anyhow::bail!("no remote object {file_id}")
        })();

        self.track_end();
        result
    }
}

// ============================================================================
// FakeVaultStore
// ============================================================================

#[derive(Debug, Clone)]
struct LocalFile {
    content: Vec<u8>,
    mtime_ms: i64,
}

/// In-memory vault with counters and failure injection
///
/// `write_file` refuses to write when the parent folder was never
/// created, so tests catch engines that skip folder creation.
pub(crate) struct FakeVaultStore {
    files: Mutex<BTreeMap<String, LocalFile>>,
    folders: Mutex<HashSet<String>>,

    pub list_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub create_folder_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,

    fail_list: AtomicBool,
    fail_delete_paths: Mutex<HashSet<String>>,
}

impl FakeVaultStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            folders: Mutex::new(HashSet::new()),
            list_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            create_folder_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_delete_paths: Mutex::new(HashSet::new()),
        }
    }

    /// Seeds a file, implicitly creating its parent folders
    pub fn seed_file(&self, path: &str, content: &[u8], mtime_ms: i64) {
        if let Some(parent) = vault_path(path).parent() {
            self.insert_folders(parent.as_str());
        }
        self.files.lock().unwrap().insert(
            path.to_string(),
            LocalFile {
                content: content.to_vec(),
                mtime_ms,
            },
        );
    }

    /// Makes `list_files` fail
    pub fn fail_listing(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    /// Fails every delete of this path
    pub fn fail_delete_of(&self, path: &str) {
        self.fail_delete_paths
            .lock()
            .unwrap()
            .insert(path.to_string());
    }

    /// Removes a file without going through the port
    pub fn remove_seeded(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
    }

    pub fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|f| f.content.clone())
    }

    pub fn file_mtime(&self, path: &str) -> Option<i64> {
        self.files.lock().unwrap().get(path).map(|f| f.mtime_ms)
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.folders.lock().unwrap().contains(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    fn insert_folders(&self, path: &str) {
        let mut folders = self.folders.lock().unwrap();
        let mut prefix = String::new();
        for segment in path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            folders.insert(prefix.clone());
        }
    }
}

#[async_trait::async_trait]
impl IVaultStore for FakeVaultStore {
    async fn list_files(&self) -> anyhow::Result<Vec<VaultFile>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            anyhow::bail!("injected enumeration failure");
        }

        let files = self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(path, file)| {
                let path = vault_path(path);
                let extension = path.extension().map(str::to_string);
                VaultFile {
                    path,
                    extension,
                    mtime_ms: file.mtime_ms,
                    size: file.content.len() as u64,
                }
            })
            .collect();
        Ok(files)
    }

    async fn get_file(&self, path: &VaultPath) -> anyhow::Result<Option<VaultFile>> {
        let found = self.files.lock().unwrap().get(path.as_str()).map(|file| {
            VaultFile {
                path: path.clone(),
                extension: path.extension().map(str::to_string),
                mtime_ms: file.mtime_ms,
                size: file.content.len() as u64,
            }
        });
        Ok(found)
    }

    async fn read_text(&self, path: &VaultPath) -> anyhow::Result<String> {
        let content = self
            .file_content(path.as_str())
            .ok_or_else(|| anyhow::anyhow!("no local file {path}"))?;
        Ok(String::from_utf8(content)?)
    }

    async fn read_bytes(&self, path: &VaultPath) -> anyhow::Result<Vec<u8>> {
        self.file_content(path.as_str())
            .ok_or_else(|| anyhow::anyhow!("no local file {path}"))
    }

    async fn write_file(
        &self,
        path: &VaultPath,
        data: &[u8],
        mtime_ms: Option<i64>,
    ) -> anyhow::Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(parent) = path.parent() {
            if !self.folders.lock().unwrap().contains(parent.as_str()) {
                anyhow::bail!("parent folder missing for {path}");
            }
        }

        self.files.lock().unwrap().insert(
            path.as_str().to_string(),
            LocalFile {
                content: data.to_vec(),
                mtime_ms: mtime_ms.unwrap_or_else(|| Utc::now().timestamp_millis()),
            },
        );
        Ok(())
    }

    async fn create_folder(&self, path: &VaultPath) -> anyhow::Result<()> {
        self.create_folder_calls.fetch_add(1, Ordering::SeqCst);
        self.insert_folders(path.as_str());
        Ok(())
    }

    async fn delete_file(&self, path: &VaultPath) -> anyhow::Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .fail_delete_paths
            .lock()
            .unwrap()
            .contains(path.as_str())
        {
            anyhow::bail!("injected delete failure");
        }
        if self.files.lock().unwrap().remove(path.as_str()).is_none() {
            anyhow::bail!("no local file {path}");
        }
        Ok(())
    }
}

// ============================================================================
// FakeTokenManager
// ============================================================================

/// Token manager returning a fixed token, or failing when told to
pub(crate) struct FakeTokenManager {
    pub calls: AtomicUsize,
    fail: bool,
}

impl FakeTokenManager {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl ITokenManager for FakeTokenManager {
    async fn ensure_valid(&self) -> Result<AccessToken, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SyncError::Auth {
                reason: "injected refresh failure".to_string(),
            });
        }
        Ok(AccessToken::new("token-1".to_string()))
    }
}
