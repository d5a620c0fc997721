use crate::item::Item;
use directories::ProjectDirs;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 50;
pub const HISTORY_KEY: &str = "history";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to determine data directory")]
    DataDirNotFound,
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed stored value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal key/value persistence the history is written through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the platform data directory for the app.
    pub fn in_data_dir() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("org", "rota", "rota").ok_or(StoreError::DataDirNotFound)?;
        Ok(Self::new(dirs.data_dir()))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Monotonic resolution counter, survives reloads.
    pub order: u64,
    pub item: Item,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Persisted {
    next_order: u64,
    entries: Vec<HistoryEntry>,
}

/// Bounded outcome log, most recent first.
pub struct History<S> {
    store: S,
    capacity: usize,
    next_order: u64,
    entries: VecDeque<HistoryEntry>,
}

impl<S: KeyValueStore> History<S> {
    /// Loads whatever the store holds. A corrupt value is logged and replaced by an empty log.
    pub fn load(store: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let persisted = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Persisted>(&raw).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable history: {}", e);
                Persisted::default()
            }),
            Ok(None) => Persisted::default(),
            Err(e) => {
                log::error!("Failed to read history: {}", e);
                Persisted::default()
            }
        };

        let mut entries: VecDeque<_> = persisted.entries.into();
        entries.truncate(capacity);
        let next_order = entries
            .iter()
            .map(|e| e.order + 1)
            .max()
            .unwrap_or(0)
            .max(persisted.next_order);

        Self {
            store,
            capacity,
            next_order,
            entries,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Prepends an outcome, evicting the oldest beyond capacity, and persists.
    pub fn record(&mut self, item: Item) -> Result<&HistoryEntry, StoreError> {
        self.entries.push_front(HistoryEntry {
            order: self.next_order,
            item,
        });
        self.next_order += 1;
        self.entries.truncate(self.capacity);
        self.persist()?;
        Ok(&self.entries[0])
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let persisted = Persisted {
            next_order: self.next_order,
            entries: self.entries.iter().cloned().collect(),
        };
        let raw = serde_json::to_string(&persisted)?;
        self.store.set(HISTORY_KEY, &raw)
    }
}
