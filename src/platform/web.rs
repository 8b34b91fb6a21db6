//! Browser LocalStorage backend

use wasm_bindgen::JsValue;

use crate::persistence::{KeyValueStore, PersistError};

pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, PersistError> {
        let window = web_sys::window().ok_or_else(|| PersistError::Storage("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| PersistError::Storage("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage.set_item(key, value).map_err(js_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.storage.remove_item(key).map_err(js_err)
    }
}

fn js_err(value: JsValue) -> PersistError {
    PersistError::Storage(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}
