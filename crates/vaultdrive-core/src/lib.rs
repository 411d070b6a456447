//! Vaultdrive Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `VaultPath`, `RemoteId`, `Credentials`,
//!   `SyncRecordStore`, `SyncSession`, `SyncReport`
//! - **Settings** - the persisted settings blob and the per-call
//!   `SyncConfig`
//! - **Port definitions** - Traits for adapters: `IVaultStore`,
//!   `IRemoteStore`, `ITokenManager`
//! - **Failure taxonomy** - `SyncError`, classified by blast radius
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture
//! pattern. The domain module contains pure business logic with no
//! external dependencies beyond the settings blob file. Ports define
//! trait interfaces that adapter crates implement; the sync engine
//! orchestrates domain entities through those ports.

pub mod config;
pub mod domain;
pub mod ports;
