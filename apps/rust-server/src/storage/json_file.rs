// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flat-file backend: the whole registry as one JSON document.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{ParticipantStore, Registry, StoreResult};

/// File name of the registry document inside the data directory.
pub const REGISTRY_FILE: &str = "xrpl-poc.json";

/// Registry stored as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `{data_dir}/xrpl-poc.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::at(data_dir.as_ref().join(REGISTRY_FILE))
    }

    /// Store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParticipantStore for JsonFileStore {
    fn load(&self) -> StoreResult<Option<Registry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let registry = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(registry))
    }

    fn save(&self, registry: &Registry) -> StoreResult<()> {
        registry.validate()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, registry)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            investors = registry.investors.len(),
            "Registry saved"
        );
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "json"
    }

    fn health_check(&self) -> StoreResult<()> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&dir)?;

        let check_file = dir.join(".health_check");
        fs::write(&check_file, b"ok")?;
        fs::remove_file(&check_file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::registry::tests::sample_registry;
    use crate::storage::StoreError;

    fn temp_store() -> (JsonFileStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (JsonFileStore::new(dir.path().join("data")), dir)
    }

    #[test]
    fn missing_file_loads_as_none() {
        let (store, _dir) = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_same_registry() {
        let (store, _dir) = temp_store();
        let registry = sample_registry();
        store.save(&registry).unwrap();

        assert!(store.path().ends_with("data/xrpl-poc.json"));
        assert_eq!(store.load().unwrap(), Some(registry));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn save_overwrites_previous_document() {
        let (store, _dir) = temp_store();
        let mut registry = sample_registry();
        store.save(&registry).unwrap();

        registry.investors.pop();
        registry.distributed = true;
        store.save(&registry).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.investors.len(), 1);
        assert!(loaded.distributed);
    }

    #[test]
    fn invalid_registry_is_not_written() {
        let (store, _dir) = temp_store();
        let mut registry = sample_registry();
        let dup = registry.investors[0].clone();
        registry.investors.push(dup);

        assert!(matches!(store.save(&registry), Err(StoreError::Invalid(_))));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let (store, _dir) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn health_check_creates_directory() {
        let (store, _dir) = temp_store();
        store.health_check().unwrap();
        assert!(store.path().parent().unwrap().exists());
        assert_eq!(store.backend(), "json");
    }
}
