use menorah_engine::{KeyValueStore, StorageError};
use wasm_bindgen::{JsCast, JsValue};

/// `window.localStorage`. Looked up per call so a page that disables
/// storage mid-session degrades to in-memory state instead of panicking.
#[derive(Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn backend(&self) -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

/// Best-effort message from a thrown `DOMException` / `Error`.
fn describe(err: JsValue) -> String {
    match err.dyn_ref::<js_sys::Error>() {
        Some(e) => String::from(e.message()),
        None => err.as_string().unwrap_or_else(|| format!("{err:?}")),
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend()?
            .get_item(key)
            .map_err(|e| StorageError::Read(describe(e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(describe(e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.backend()?
            .remove_item(key)
            .map_err(|e| StorageError::Remove(describe(e)))
    }
}
