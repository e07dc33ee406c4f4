//! Key-value storage scopes.
//!
//! The client keeps two scopes: one that lives as long as the running client
//! (the equivalent of a browser tab) and one that survives restarts. Session
//! records, login history and the activity feed always live in the persistent
//! scope; credentials go to whichever scope the user chose at login.

mod file;
mod memory;

use std::{path::Path, sync::Arc};

use crate::error::StorageError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Synchronous string-keyed store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    /// Cleared when the client exits.
    Session,
    /// Kept across restarts ("remember me").
    Persistent,
}

#[derive(Clone)]
pub struct ClientStorage {
    session: Arc<dyn KeyValueStore>,
    persistent: Arc<dyn KeyValueStore>,
}

impl ClientStorage {
    pub fn new(session: Arc<dyn KeyValueStore>, persistent: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session,
            persistent,
        }
    }

    /// Both scopes in memory. Used by tests and offline runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Both scopes on disk: persistent under `dir`, session under `dir/session`.
    /// The command-line client runs one process per command, so its session
    /// scope has to outlive the process and is wiped on logout instead.
    pub fn on_disk(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            Arc::new(FileStore::new(dir.join("session"))),
            Arc::new(FileStore::new(dir)),
        )
    }

    pub fn scope(&self, scope: StorageScope) -> Arc<dyn KeyValueStore> {
        match scope {
            StorageScope::Session => self.session.clone(),
            StorageScope::Persistent => self.persistent.clone(),
        }
    }

    pub fn session(&self) -> Arc<dyn KeyValueStore> {
        self.scope(StorageScope::Session)
    }

    pub fn persistent(&self) -> Arc<dyn KeyValueStore> {
        self.scope(StorageScope::Persistent)
    }
}
