// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational backend: participants and currencies as rows in an embedded
//! redb database (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `participants`: insertion ordinal → serialized participant row
//! - `currencies`: insertion ordinal → serialized currency row
//! - `meta`: key → value (`network`, `distributed`)
//!
//! The admin is the participant row with role `admin`; investors keep the
//! order of their ordinals.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{CurrencyDeclaration, Participant, ParticipantStore, Registry, Role, StoreError, StoreResult};

// =============================================================================
// Table Definitions
// =============================================================================

/// Participant rows (JSON bytes) keyed by insertion ordinal.
const PARTICIPANTS: TableDefinition<u64, &[u8]> = TableDefinition::new("participants");

/// Currency rows (JSON bytes) keyed by insertion ordinal.
const CURRENCIES: TableDefinition<u64, &[u8]> = TableDefinition::new("currencies");

/// Scalar registry fields.
const META: TableDefinition<&str, &str> = TableDefinition::new("meta");

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "participants.redb";

/// Registry stored as relational rows.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// Open (or create) the database at `{data_dir}/participants.redb`.
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_at(data_dir.as_ref().join(DATABASE_FILE))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(&path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PARTICIPANTS)?;
            let _ = write_txn.open_table(CURRENCIES)?;
            let _ = write_txn.open_table(META)?;
        }
        write_txn.commit()?;

        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParticipantStore for RedbStore {
    fn load(&self) -> StoreResult<Option<Registry>> {
        let read_txn = self.db.begin_read()?;
        let participants = read_txn.open_table(PARTICIPANTS)?;
        let currencies_table = read_txn.open_table(CURRENCIES)?;
        let meta = read_txn.open_table(META)?;

        let mut admin: Option<Participant> = None;
        let mut investors = Vec::new();
        for entry in participants.iter()? {
            let (_, row) = entry?;
            let participant: Participant = serde_json::from_slice(row.value())?;
            match participant.role {
                // Oldest admin row wins
                Role::Admin if admin.is_none() => admin = Some(participant),
                Role::Admin => {}
                Role::Investor => investors.push(participant),
            }
        }

        let Some(admin) = admin else {
            if !investors.is_empty() {
                return Err(StoreError::Corrupt(
                    "investor rows present without an admin row".to_string(),
                ));
            }
            return Ok(None);
        };

        let mut currencies = Vec::new();
        for entry in currencies_table.iter()? {
            let (_, row) = entry?;
            let currency: CurrencyDeclaration = serde_json::from_slice(row.value())?;
            currencies.push(currency);
        }

        let network = meta
            .get("network")?
            .map(|v| v.value().to_string())
            .unwrap_or_else(|| "testnet".to_string());
        let distributed = meta
            .get("distributed")?
            .map(|v| v.value() == "true")
            .unwrap_or(false);

        Ok(Some(Registry {
            network,
            admin,
            investors,
            currencies,
            distributed,
        }))
    }

    fn save(&self, registry: &Registry) -> StoreResult<()> {
        registry.validate()?;

        let write_txn = self.db.begin_write()?;
        {
            let mut participants = write_txn.open_table(PARTICIPANTS)?;
            participants.retain(|_, _| false)?;
            let rows = std::iter::once(&registry.admin).chain(registry.investors.iter());
            for (ordinal, participant) in rows.enumerate() {
                let json = serde_json::to_vec(participant)?;
                participants.insert(ordinal as u64, json.as_slice())?;
            }

            let mut currencies = write_txn.open_table(CURRENCIES)?;
            currencies.retain(|_, _| false)?;
            for (ordinal, currency) in registry.currencies.iter().enumerate() {
                let json = serde_json::to_vec(currency)?;
                currencies.insert(ordinal as u64, json.as_slice())?;
            }

            let mut meta = write_txn.open_table(META)?;
            meta.insert("network", registry.network.as_str())?;
            meta.insert("distributed", if registry.distributed { "true" } else { "false" })?;
        }
        write_txn.commit()?;

        tracing::debug!(
            path = %self.path.display(),
            investors = registry.investors.len(),
            "Registry saved"
        );
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redb"
    }

    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(META)?;
        Ok(())
    }
}
