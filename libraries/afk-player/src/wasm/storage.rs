//! `window.localStorage` as the key/value store
//!
//! Storage is looked up on every call: it can be missing entirely (sandboxed
//! frames, some private modes) and every access may throw.

use super::js_message;
use crate::error::StoreError;
use crate::platform::KeyValueStore;
use web_sys::Storage;

#[derive(Debug, Default, Clone, Copy)]
pub struct WebStorage;

impl WebStorage {
    fn storage() -> Result<Storage, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(js_message(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::WriteRejected(js_message(&e)))
    }
}
