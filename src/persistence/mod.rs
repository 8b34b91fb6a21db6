//! Snapshot persistence and remote sync
//!
//! Features:
//! - JSON snapshot of every live idea (bare array, legacy keys accepted)
//! - Local mode: one blob in a key-value store, rewritten on every change
//! - Remote mode: push/remove against a feed, reconciled from its echoes

pub mod local;
pub mod remote;
pub mod snapshot;

use std::collections::HashMap;

use thiserror::Error;

pub use local::LocalBridge;
pub use remote::{LoopbackFeed, RemoteBridge, RemoteEvent, RemoteFeed};
pub use snapshot::{IdeaRecord, decode_snapshot, encode_snapshot};

/// Failures in the persistence layer. The board logs these and carries on.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("malformed snapshot: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("could not encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("remote feed rejected request: {0}")]
    Remote(String),
}

/// Opaque string key-value storage (LocalStorage in the browser)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Shared handle, so the host can keep inspecting a store the board owns
impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<std::cell::RefCell<S>> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.borrow_mut().remove(key)
    }
}
