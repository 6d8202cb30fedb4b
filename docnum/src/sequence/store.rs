//! Counter storage
//!
//! The JSON store keeps the whole key → record map in memory, loaded once
//! at open, and rewrites the file in full on every `put`. Every historical
//! key is carried across rewrites.
//!
//! There is no locking: one writer process is assumed.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use shared::{CounterKey, CounterRecord};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Counter file I/O error ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Counter file is not valid JSON ({path}): {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable key → record persistence for daily counters
pub trait CounterStore {
    fn get(&self, key: &CounterKey) -> StoreResult<Option<CounterRecord>>;

    fn put(&mut self, key: &CounterKey, record: CounterRecord) -> StoreResult<()>;
}

/// Counter store backed by a pretty-printed JSON file
#[derive(Debug)]
pub struct JsonCounterStore {
    path: PathBuf,
    entries: BTreeMap<String, CounterRecord>,
}

impl JsonCounterStore {
    /// Open the store, starting empty when the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => {
                let entries: BTreeMap<String, CounterRecord> = serde_json::from_str(&contents)
                    .map_err(|source| StoreError::Serialization {
                        path: path.clone(),
                        source,
                    })?;
                info!(path = %path.display(), keys = entries.len(), "Counter data loaded");
                entries
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No counter file yet, starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored keys (all days)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write `entries` to a tmp file next to the store, then rename it over
    /// the store file
    fn save(&self, entries: &BTreeMap<String, CounterRecord>) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(entries).map_err(|source| {
            StoreError::Serialization {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        debug!(path = %self.path.display(), keys = entries.len(), "Counter data saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl CounterStore for JsonCounterStore {
    fn get(&self, key: &CounterKey) -> StoreResult<Option<CounterRecord>> {
        Ok(self.entries.get(&key.to_string()).copied())
    }

    /// The in-memory map only changes once the file is written
    fn put(&mut self, key: &CounterKey, record: CounterRecord) -> StoreResult<()> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), record);
        self.save(&entries)?;
        self.entries = entries;
        Ok(())
    }
}

/// In-memory counter store
#[derive(Debug, Default, Clone)]
pub struct MemoryCounterStore {
    entries: HashMap<String, CounterRecord>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn get(&self, key: &CounterKey) -> StoreResult<Option<CounterRecord>> {
        Ok(self.entries.get(&key.to_string()).copied())
    }

    fn put(&mut self, key: &CounterKey, record: CounterRecord) -> StoreResult<()> {
        self.entries.insert(key.to_string(), record);
        Ok(())
    }
}
