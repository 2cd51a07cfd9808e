use crate::models::NotesState;
use leptos::logging::warn;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

pub const STORAGE_KEY: &str = "hey.notes.v1";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("failed to read `{key}`")]
    Read { key: String },
    #[error("failed to write `{key}`")]
    Write { key: String },
    #[error("quota exceeded writing `{key}` ({needed} bytes, {quota} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("stored value is malformed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value slot, shaped after `window.localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// `window.localStorage`. Resolved on every call, so the handle stays `Send`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> StorageResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Self::storage()?.get_item(key).map_err(|_| StorageError::Read {
            key: key.to_string(),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        // Browsers report quota errors as a DOMException; we don't distinguish them.
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Write {
                key: key.to_string(),
            })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|_| StorageError::Write {
                key: key.to_string(),
            })
    }
}

/// In-process storage, optionally with a byte quota shared by all keys.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RefCell::default(),
            quota: Some(quota),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

pub fn read_json<T, S>(storage: &S, key: &str) -> StorageResult<Option<T>>
where
    T: for<'de> Deserialize<'de>,
    S: KeyValueStore + ?Sized,
{
    let Some(json) = storage.get_item(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(StorageError::Deserialize)
}

pub fn write_json<T, S>(storage: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(StorageError::Serialize)?;
    storage.set_item(key, &json)
}

/// Load the notes state, falling back to the empty default on any failure.
pub fn load_state<S: KeyValueStore + ?Sized>(storage: &S, key: &str) -> NotesState {
    match read_json::<NotesState, _>(storage, key) {
        Ok(Some(state)) => state,
        Ok(None) => NotesState::default(),
        Err(e) => {
            warn!("[storage] discarding stored notes: {e}");
            NotesState::default()
        }
    }
}

/// Persist the notes state. Failures are dropped; the in-memory state stays authoritative.
pub fn save_state<S: KeyValueStore + ?Sized>(storage: &S, key: &str, state: &NotesState) {
    if let Err(e) = write_json(storage, key, state) {
        warn!("[storage] failed to persist notes: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Note, SortMode};

    fn sample_state() -> NotesState {
        NotesState {
            notes: vec![Note {
                id: "a".to_string(),
                title: "Groceries".to_string(),
                body: "milk".to_string(),
                tags: vec!["home".to_string()],
                pinned: true,
                created_at: 10,
                updated_at: 20,
            }],
            selected_id: Some("a".to_string()),
            search: "gro".to_string(),
            tag_filter: Some("home".to_string()),
            sort: SortMode::Title,
        }
    }

    #[test]
    fn test_load_missing_key_is_default() {
        let storage = MemoryStorage::new();
        assert_eq!(load_state(&storage, STORAGE_KEY), NotesState::default());
    }

    #[test]
    fn test_default_state_shape() {
        let s = NotesState::default();
        assert!(s.notes.is_empty());
        assert!(s.selected_id.is_none());
        assert_eq!(s.search, "");
        assert!(s.tag_filter.is_none());
        assert_eq!(s.sort, SortMode::Updated);
    }

    #[test]
    fn test_save_then_load_reproduces_state() {
        let storage = MemoryStorage::new();
        let state = sample_state();
        save_state(&storage, STORAGE_KEY, &state);
        assert_eq!(load_state(&storage, STORAGE_KEY), state);
    }

    #[test]
    fn test_load_malformed_is_default() {
        let storage = MemoryStorage::new();
        storage
            .set_item(STORAGE_KEY, "{not json")
            .expect("memory write should succeed");
        assert_eq!(load_state(&storage, STORAGE_KEY), NotesState::default());

        // Valid JSON with the wrong shape is discarded too.
        storage
            .set_item(STORAGE_KEY, r#"{"notes": 3}"#)
            .expect("memory write should succeed");
        assert_eq!(load_state(&storage, STORAGE_KEY), NotesState::default());
    }

    #[test]
    fn test_read_json_reports_malformed() {
        let storage = MemoryStorage::new();
        storage
            .set_item("k", "[")
            .expect("memory write should succeed");
        let err = read_json::<NotesState, _>(&storage, "k").expect_err("should fail");
        assert!(matches!(err, StorageError::Deserialize(_)));
    }

    #[test]
    fn test_save_over_quota_is_swallowed() {
        let storage = MemoryStorage::with_quota(16);
        save_state(&storage, STORAGE_KEY, &sample_state());
        assert!(storage
            .get_item(STORAGE_KEY)
            .expect("memory read should succeed")
            .is_none());
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let storage = MemoryStorage::with_quota(8);
        storage.set_item("k", "1234").expect("fits");
        storage.set_item("k", "12345").expect("replacement fits");
        let err = storage.set_item("k2", "1").expect_err("over quota");
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_browser_storage_roundtrip() {
        let key = "hey.notes.test";
        let storage = BrowserStorage;
        let _ = storage.remove_item(key);

        assert_eq!(load_state(&storage, key), NotesState::default());

        let state = NotesState {
            search: "q".to_string(),
            ..Default::default()
        };
        save_state(&storage, key, &state);
        assert_eq!(load_state(&storage, key), state);

        let _ = storage.remove_item(key);
    }
}
