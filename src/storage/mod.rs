// Dedup ledger: the in-memory key set and its swappable backing stores
pub mod file;
pub mod sqlite;

pub use file::FileLedgerStore;
pub use sqlite::SqliteLedgerStore;

use crate::config::{LedgerBackend, LedgerConfig};
use crate::model::StorageError;
use std::collections::HashSet;

/// Persistence for the set of identity keys.
///
/// `load` on a store that does not exist yet returns an empty set.
/// `persist` replaces the whole store with exactly the given keys.
pub trait LedgerStore {
    fn load(&self) -> Result<HashSet<String>, StorageError>;
    fn persist(&self, keys: &HashSet<String>) -> Result<(), StorageError>;
}

/// In-memory ledger, the single source of truth during a run.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    keys: HashSet<String>,
}

impl Ledger {
    pub fn new(keys: HashSet<String>) -> Self {
        Self { keys }
    }

    pub fn load_from(store: &dyn LedgerStore) -> Result<Self, StorageError> {
        store.load().map(Self::new)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns `false` if the key was already present.
    pub fn add(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &HashSet<String> {
        &self.keys
    }

    pub fn persist_to(&self, store: &dyn LedgerStore) -> Result<(), StorageError> {
        store.persist(&self.keys)
    }
}

pub fn open_store(config: &LedgerConfig) -> Result<Box<dyn LedgerStore>, StorageError> {
    let path = config.path();
    Ok(match config.backend {
        LedgerBackend::File => Box::new(FileLedgerStore::new(path)),
        LedgerBackend::Sqlite => Box::new(SqliteLedgerStore::new(path)?),
    })
}
