use crate::error::Result;
use crate::schema::AccountSelector;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage key under which the chosen account survives restarts.
pub const SELECTED_ACCOUNT_KEY: &str = "controleEfetivo.selectedAccount";

/// Durable key-value storage for view preferences.
pub trait SelectionStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Reads the persisted selector, falling back to all accounts when nothing
/// is stored or the store cannot be read.
pub fn load_selector<P: SelectionStore + ?Sized>(store: &P) -> AccountSelector {
    match store.load(SELECTED_ACCOUNT_KEY) {
        Ok(Some(value)) => AccountSelector::from_choice(&value),
        Ok(None) => AccountSelector::All,
        Err(e) => {
            debug!("Could not read persisted account selection: {}", e);
            AccountSelector::All
        }
    }
}

pub fn save_selector<P: SelectionStore + ?Sized>(
    store: &P,
    selector: &AccountSelector,
) -> Result<()> {
    store.save(SELECTED_ACCOUNT_KEY, selector.as_query_value())
}

/// Keeps every key in one JSON object file.
#[derive(Debug, Clone)]
pub struct JsonFileSelectionStore {
    path: PathBuf,
}

impl JsonFileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SelectionStore for JsonFileSelectionStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.entries().insert(key.to_string(), value.to_string());
        store
    }

    /// Every write is a single insert, so the map behind a poisoned lock is
    /// still consistent.
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SelectionStore for MemorySelectionStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSelectionStore::new(dir.path().join("prefs").join("ledger.json"));

        assert_eq!(load_selector(&store), AccountSelector::All);

        let selector = AccountSelector::Account("A1".to_string());
        save_selector(&store, &selector).unwrap();
        store.save("other.key", "kept").unwrap();

        let reopened = JsonFileSelectionStore::new(store.path().to_path_buf());
        assert_eq!(load_selector(&reopened), selector);
        assert_eq!(reopened.load("other.key").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_all() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileSelectionStore::new(path);
        assert!(store.load(SELECTED_ACCOUNT_KEY).is_err());
        assert_eq!(load_selector(&store), AccountSelector::All);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySelectionStore::with_entry(SELECTED_ACCOUNT_KEY, "B2");
        assert_eq!(
            load_selector(&store),
            AccountSelector::Account("B2".to_string())
        );
        save_selector(&store, &AccountSelector::All).unwrap();
        assert_eq!(store.load(SELECTED_ACCOUNT_KEY).unwrap().as_deref(), Some("all"));
    }

    #[test]
    fn test_memory_store_survives_poisoned_lock() {
        let store = MemorySelectionStore::with_entry(SELECTED_ACCOUNT_KEY, "A1");

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.entries.lock().unwrap();
            panic!("writer died while holding the lock");
        }));
        assert!(poisoned.is_err());
        assert!(store.entries.is_poisoned());

        assert_eq!(
            load_selector(&store),
            AccountSelector::Account("A1".to_string())
        );
        save_selector(&store, &AccountSelector::Account("B2".to_string())).unwrap();
        assert_eq!(store.load(SELECTED_ACCOUNT_KEY).unwrap().as_deref(), Some("B2"));
    }
}
