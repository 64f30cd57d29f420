// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Participant Storage
//!
//! Persists the [`Registry`]: the admin wallet, investor wallets and the
//! declared currencies. Workflows depend only on the [`ParticipantStore`]
//! capability; the backend is chosen at startup.
//!
//! ## Backends
//!
//! - [`JsonFileStore`]: one pretty-printed JSON document,
//!   `{data_dir}/xrpl-poc.json`, replaced atomically on every save
//! - [`RedbStore`]: relational rows in an embedded redb database,
//!   `{data_dir}/participants.redb`
//!
//! ## Important Notes
//!
//! - Secrets are stored in clear; protect `DATA_DIR` accordingly
//! - A missing document or empty database means "not yet provisioned"
//!   and loads as `None`
//! - Neither backend isolates concurrent writers from other processes

pub mod json_file;
pub mod registry;
pub mod relational;

pub use json_file::JsonFileStore;
pub use registry::{
    CurrencyDeclaration, Participant, PublicParticipant, PublicRegistry, Registry, RegistryError,
    Role, WalletCheckError,
};
pub use relational::RedbStore;

/// Read/write access to the persisted registry.
pub trait ParticipantStore: Send + Sync {
    /// Load the registry, `None` if nothing has been provisioned yet.
    fn load(&self) -> StoreResult<Option<Registry>>;

    /// Replace the stored registry. The registry is validated first.
    fn save(&self, registry: &Registry) -> StoreResult<()>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Verify the backend is reachable and writable.
    fn health_check(&self) -> StoreResult<()>;
}

/// Error type for participant storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid registry: {0}")]
    Invalid(#[from] RegistryError),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
