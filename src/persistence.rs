//! Persistence bridge.
//!
//! The diagram is stored as one JSON document under a single key of a
//! string key-value store. Writes are best effort: [`save`] logs failures
//! and reports them as `false`, [`load`] falls back to the caller's default.
//! [`try_save`] and [`try_load`] expose the underlying errors.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::PersistenceError;
use crate::state::DiagramState;

/// Durable string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// and inspect what the editor wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push the total stored bytes over `quota`.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Bytes held under every key.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if let Some(quota) = self.quota {
            let replaced = self
                .entries
                .borrow()
                .get(key)
                .map_or(0, |old| key.len() + old.len());
            let size = self.used_bytes() - replaced + key.len() + value.len();
            if size > quota {
                return Err(PersistenceError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    quota,
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

pub fn try_save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let text = serde_json::to_string(value).map_err(|source| PersistenceError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &text)
}

/// Best-effort write. Failures are logged and reported as `false`.
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    match try_save(store, key, value) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Error saving '{key}' to storage: {err}");
            false
        }
    }
}

/// `Ok(None)` when nothing is stored under `key`.
pub fn try_load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistenceError> {
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| PersistenceError::Deserialize {
            key: key.to_string(),
            source,
        })
}

/// Read `key`, falling back to `default` when missing or malformed.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match try_load(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            log::warn!("Error loading '{key}' from storage: {err}");
            default
        }
    }
}

/// A [`KeyValueStore`] bound to the diagram's storage key.
pub struct DiagramStore {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl DiagramStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save_diagram(&self, state: &DiagramState) -> bool {
        let saved = save(self.store.as_ref(), &self.key, state);
        if saved {
            log::info!(
                "Saved diagram ({} nodes, {} edges)",
                state.nodes.len(),
                state.edges.len()
            );
        }
        saved
    }

    /// Load the stored diagram, or an empty one.
    ///
    /// The id counter is raised above every loaded id and edges that point at
    /// missing nodes are dropped.
    pub fn load_diagram(&self) -> DiagramState {
        let mut state = load(self.store.as_ref(), &self.key, DiagramState::default());
        Self::repair(&mut state);
        state
    }

    /// Like [`DiagramStore::load_diagram`] but surfaces storage and parse
    /// errors. `Ok(None)` when nothing has been saved yet.
    pub fn try_load_diagram(&self) -> Result<Option<DiagramState>, PersistenceError> {
        let loaded: Option<DiagramState> = try_load(self.store.as_ref(), &self.key)?;
        Ok(loaded.map(|mut state| {
            Self::repair(&mut state);
            state
        }))
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.store.remove(&self.key)
    }

    fn repair(state: &mut DiagramState) {
        state.normalize_counter();
        let dropped = state.prune_dangling_edges();
        if dropped > 0 {
            log::warn!("Dropped {dropped} dangling edges from stored diagram");
        }
        log::info!(
            "Loaded diagram ({} nodes, {} edges, next id {})",
            state.nodes.len(),
            state.edges.len(),
            state.node_id_counter
        );
    }
}
