//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (animation timestamps, seeds)
//! - Storage (LocalStorage on web, memory natively)

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

use crate::persistence::{KeyValueStore, MemoryStore};

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for the board RNG
pub fn seed() -> u64 {
    now_ms() as u64
}

/// The best persistent store available on this platform
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            log::warn!("LocalStorage unavailable ({}), ideas won't survive a reload", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// The best persistent store available on this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(MemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_positive() {
        assert!(now_ms() > 0.0);
        assert!(seed() > 0);
    }

    #[test]
    fn test_default_store_round_trips() {
        let mut store = default_store();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
