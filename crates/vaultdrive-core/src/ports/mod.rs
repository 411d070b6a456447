//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the engine depends
//! on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IVaultStore`] - The local file collection being synchronized
//! - [`IRemoteStore`] - The remote object store's HTTP API
//! - [`ITokenManager`] - Bearer-token acquisition before remote calls

pub mod remote_store;
pub mod token_manager;
pub mod vault_store;

pub use remote_store::{
    AccessToken, IRemoteStore, RemoteObjectMetadata, RemotePage, EDITOR_NATIVE_MIME_PREFIX,
    FOLDER_MIME_TYPE,
};
pub use token_manager::ITokenManager;
pub use vault_store::{IVaultStore, VaultFile};
