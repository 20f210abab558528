use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::metadata::QTableMetadata;
use crate::ai::QTable;
use crate::error::PersistenceError;

/// Version written into every saved document.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk document: a MessagePack map of `{version, metadata, table}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedQTable {
    pub version: u32,
    pub metadata: QTableMetadata,
    pub table: QTable,
}

#[derive(Serialize)]
struct SavedQTableRef<'a> {
    version: u32,
    metadata: &'a QTableMetadata,
    table: &'a QTable,
}

/// Loads and atomically saves a Q-table at a fixed path.
#[derive(Debug, Clone)]
pub struct QStore {
    path: PathBuf,
}

impl QStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        QStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<file>.meta.json` next to the table.
    pub fn meta_path(&self) -> PathBuf {
        with_suffix(&self.path, ".meta.json")
    }

    /// Write the table to `<file>.tmp`, rename it into place, then refresh the sidecar.
    pub fn save(&self, table: &QTable, metadata: &QTableMetadata) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let doc = SavedQTableRef {
            version: FORMAT_VERSION,
            metadata,
            table,
        };
        let bytes = rmp_serde::to_vec_named(&doc)?;

        let tmp = with_suffix(&self.path, ".tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;

        fs::write(self.meta_path(), serde_json::to_string_pretty(metadata)?)?;

        info!(
            "saved Q-table to {} ({} entries, {} games)",
            self.path.display(),
            metadata.entries,
            metadata.games_trained
        );
        Ok(())
    }

    pub fn load(&self) -> Result<SavedQTable, PersistenceError> {
        let bytes = fs::read(&self.path).map_err(|source| PersistenceError::Read {
            path: self.path.clone(),
            source,
        })?;
        let saved: SavedQTable =
            rmp_serde::from_slice(&bytes).map_err(|source| PersistenceError::Decode {
                path: self.path.clone(),
                source,
            })?;

        if saved.version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: saved.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(saved)
    }

    /// Like [`load`](Self::load), but a missing file yields an empty table.
    pub fn load_or_default(&self) -> Result<SavedQTable, PersistenceError> {
        if !self.path.exists() {
            warn!(
                "Q-table file {} not found, starting with an empty table",
                self.path.display()
            );
            return Ok(SavedQTable {
                version: FORMAT_VERSION,
                ..Default::default()
            });
        }
        self.load()
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, GameState};

    fn sample_table() -> QTable {
        let mut table = QTable::new();
        let empty = Board::new();
        table.update(&empty, 3, 1.0, 0.3);
        table.update(&empty, 0, -1.0, 0.3);
        let after = GameState::initial().apply_move(2).unwrap();
        table.update(after.board(), 2, 0.5, 1.0);
        table
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = QStore::new(dir.path().join("magnus_q.pkl"));
        let table = sample_table();
        let meta = QTableMetadata::describe(&table, 7, 0.3);

        store.save(&table, &meta).unwrap();
        assert!(store.path().exists());
        assert!(!dir.path().join("magnus_q.pkl.tmp").exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.version, FORMAT_VERSION);
        assert_eq!(loaded.metadata, meta);
        assert_eq!(loaded.table.len(), table.len());
        for (key, entry) in table.iter() {
            let other = loaded.table.iter().find(|(k, _)| *k == key).map(|(_, e)| *e);
            assert_eq!(other, Some(*entry));
        }
    }

    #[test]
    fn test_sidecar_is_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = QStore::new(dir.path().join("q.pkl"));
        let table = sample_table();
        store
            .save(&table, &QTableMetadata::describe(&table, 2, 0.3))
            .unwrap();

        assert_eq!(store.meta_path(), dir.path().join("q.pkl.meta.json"));
        let json = fs::read_to_string(store.meta_path()).unwrap();
        let meta: QTableMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta.entries, 3);
        assert_eq!(meta.games_trained, 2);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = QStore::new(dir.path().join("nested/deeper/q.pkl"));
        store
            .save(&QTable::new(), &QTableMetadata::default())
            .unwrap();
        assert!(store.load().unwrap().table.is_empty());
    }

    #[test]
    fn test_missing_file_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = QStore::new(dir.path().join("absent.pkl"));

        let loaded = store.load_or_default().unwrap();
        assert!(loaded.table.is_empty());
        assert_eq!(loaded.metadata.games_trained, 0);
        assert!(matches!(store.load(), Err(PersistenceError::Read { .. })));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.pkl");
        fs::write(&path, b"definitely not msgpack").unwrap();

        let err = QStore::new(&path).load_or_default().unwrap_err();
        assert!(matches!(err, PersistenceError::Decode { .. }), "got: {err}");
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.pkl");
        let doc = SavedQTableRef {
            version: 9,
            metadata: &QTableMetadata::default(),
            table: &QTable::new(),
        };
        fs::write(&path, rmp_serde::to_vec_named(&doc).unwrap()).unwrap();

        let err = QStore::new(&path).load().unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::UnsupportedVersion { found: 9, expected: 1 }
        ));
    }

    #[test]
    fn test_save_overwrites_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = QStore::new(dir.path().join("q.pkl"));
        let table = sample_table();
        store
            .save(&table, &QTableMetadata::describe(&table, 1, 0.3))
            .unwrap();
        store
            .save(&QTable::new(), &QTableMetadata::default())
            .unwrap();

        assert!(store.load().unwrap().table.is_empty());
    }
}
