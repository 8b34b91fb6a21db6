//! Local snapshot mode: the whole board lives in one key-value entry

use super::snapshot::{IdeaRecord, decode_snapshot, encode_snapshot};
use super::{KeyValueStore, PersistError};
use crate::consts::STORAGE_KEY;

pub struct LocalBridge {
    store: Box<dyn KeyValueStore>,
}

impl LocalBridge {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the stored snapshot
    pub fn save(&mut self, records: &[IdeaRecord]) -> Result<(), PersistError> {
        let blob = encode_snapshot(records)?;
        self.store.set(STORAGE_KEY, &blob)?;
        log::debug!("Saved {} ideas", records.len());
        Ok(())
    }

    /// Read the stored snapshot; `Ok(None)` when nothing was saved yet
    pub fn read(&self) -> Result<Option<Vec<IdeaRecord>>, PersistError> {
        match self.store.get(STORAGE_KEY)? {
            Some(blob) => decode_snapshot(&blob).map(Some),
            None => Ok(None),
        }
    }

    /// Read the snapshot, treating any failure as an empty board
    pub fn load(&self) -> Vec<IdeaRecord> {
        match self.read() {
            Ok(Some(records)) => {
                log::info!("Loaded {} saved ideas", records.len());
                records
            }
            Ok(None) => {
                log::info!("No saved ideas, starting fresh");
                Vec::new()
            }
            Err(e) => {
                log::warn!("Ignoring saved ideas: {}", e);
                Vec::new()
            }
        }
    }

    /// Drop the stored snapshot entirely
    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.store.remove(STORAGE_KEY)?;
        log::info!("Saved ideas cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
            Err(PersistError::Storage("quota".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistError> {
            Err(PersistError::Storage("quota".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), PersistError> {
            Err(PersistError::Storage("quota".into()))
        }
    }

    fn record(text: &str) -> IdeaRecord {
        IdeaRecord {
            text: text.to_string(),
            x: Some(1.0),
            y: Some(2.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let mut bridge = LocalBridge::new(Box::new(MemoryStore::new()));
        assert!(bridge.read().unwrap().is_none());
        bridge.save(&[record("a"), record("b")]).unwrap();
        let loaded = bridge.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].text, "b");

        bridge.clear().unwrap();
        assert!(bridge.load().is_empty());
    }

    #[test]
    fn test_malformed_blob_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "[{\"text\": ").unwrap();
        let bridge = LocalBridge::new(Box::new(store));
        assert!(bridge.read().is_err());
        assert!(bridge.load().is_empty());
    }

    #[test]
    fn test_broken_store_is_survivable() {
        let mut bridge = LocalBridge::new(Box::new(BrokenStore));
        assert!(bridge.load().is_empty());
        assert!(matches!(bridge.save(&[record("a")]), Err(PersistError::Storage(_))));
    }
}
