//! Persisted filter selection.
//!
//! [`FilterStore`] owns the current [`FilterState`] and writes it to a [`PersistenceStore`] after
//! every mutation. Persistence is best-effort: write failures are logged and the in-memory
//! state stays authoritative, and a missing or unreadable saved selection loads as all-`None`.
//!
//! The saved value is a JSON envelope `{"state": {...}, "version": 0}` keyed by
//! [`FILTERS_STORAGE_KEY`].

use crate::constants::{FILTERS_STORAGE_KEY, FILTERS_STORAGE_VERSION};
use crate::filters::{FilterState, FilterUpdate};
use crate::{ContactsError, ContactsResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Scoped key-value storage for serialized UI state.
pub trait PersistenceStore {
    /// Returns the stored value for `namespace`, or `None` if nothing is stored or it cannot
    /// be read.
    fn get(&self, namespace: &str) -> Option<String>;

    fn set(&mut self, namespace: &str, value: &str) -> ContactsResult<()>;
}

/// In-memory store, for tests and sessions that should not outlive the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, namespace: &str) -> Option<String> {
        self.entries.get(namespace).cloned()
    }

    fn set(&mut self, namespace: &str, value: &str) -> ContactsResult<()> {
        self.entries.insert(namespace.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: each namespace is a `<namespace>.json` file.
///
/// The directory is created lazily on the first write.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.json"))
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, namespace: &str) -> Option<String> {
        let path = self.path_for(namespace);
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("failed to read persisted state {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&mut self, namespace: &str, value: &str) -> ContactsResult<()> {
        fs::create_dir_all(&self.dir).map_err(ContactsError::StateDirCreation)?;
        fs::write(self.path_for(namespace), value).map_err(ContactsError::FileWrite)
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedFilters {
    state: FilterState,
    #[serde(default)]
    version: u32,
}

/// The filter selection of one view, backed by a persistence store.
#[derive(Debug)]
pub struct FilterStore<S> {
    state: FilterState,
    store: S,
}

impl<S: PersistenceStore> FilterStore<S> {
    /// Restores the saved selection from `store`, falling back to defaults.
    pub fn load(store: S) -> Self {
        let state = match store.get(FILTERS_STORAGE_KEY) {
            None => FilterState::default(),
            Some(raw) => match serde_json::from_str::<PersistedFilters>(&raw) {
                Ok(persisted) => persisted.state,
                Err(e) => {
                    tracing::warn!("discarding unreadable persisted filters: {}", e);
                    FilterState::default()
                }
            },
        };

        Self { state, store }
    }

    /// Writes the current selection. Failures are logged, never returned.
    pub fn save(&mut self) {
        let persisted = PersistedFilters {
            state: self.state.clone(),
            version: FILTERS_STORAGE_VERSION,
        };
        let result = serde_json::to_string(&persisted)
            .map_err(ContactsError::Serialization)
            .and_then(|json| self.store.set(FILTERS_STORAGE_KEY, &json));

        if let Err(e) = result {
            tracing::warn!("failed to persist filters: {}", e);
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies one update, persisting it if anything changed. Returns whether it changed.
    pub fn set_filter(&mut self, update: FilterUpdate) -> bool {
        let field = update.field();
        let changed = self.state.apply(update);
        if changed {
            tracing::debug!("filter {} updated", field);
            self.save();
        }
        changed
    }

    /// Clears every filter in one update.
    pub fn clear_filters(&mut self) {
        self.state.clear();
        tracing::debug!("filters cleared");
        self.save();
    }

    pub fn to_query_params(&self) -> BTreeMap<&'static str, String> {
        self.state.to_query_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterField;
    use tempfile::TempDir;

    /// A store whose writes always fail.
    struct BrokenStore;

    impl PersistenceStore for BrokenStore {
        fn get(&self, _namespace: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _namespace: &str, _value: &str) -> ContactsResult<()> {
            Err(ContactsError::FileWrite(std::io::Error::new(
                ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn update(field: FilterField, raw: &str) -> FilterUpdate {
        FilterUpdate::parse(field, raw).unwrap()
    }

    #[test]
    fn missing_state_loads_defaults() {
        let store = FilterStore::load(MemoryStore::new());
        assert!(store.state().is_empty());
    }

    #[test]
    fn corrupt_state_loads_defaults() {
        let mut memory = MemoryStore::new();
        memory.set(FILTERS_STORAGE_KEY, "{not json").unwrap();
        assert!(FilterStore::load(memory).state().is_empty());

        let mut memory = MemoryStore::new();
        memory
            .set(FILTERS_STORAGE_KEY, r#"{"state": {"dataInicio": "yesterday"}}"#)
            .unwrap();
        assert!(FilterStore::load(memory).state().is_empty());
    }

    #[test]
    fn mutations_are_persisted_and_restored() {
        let mut store = FilterStore::load(MemoryStore::new());
        store.set_filter(update(FilterField::Clinic, "OdontoVita"));
        store.set_filter(update(FilterField::DateFrom, "2026-02-01"));

        let memory = store.store().clone();
        let restored = FilterStore::load(memory);
        assert_eq!(restored.state(), store.state());
        assert_eq!(restored.state().clinic(), Some("OdontoVita"));
    }

    #[test]
    fn persisted_envelope_matches_browser_store() {
        let mut store = FilterStore::load(MemoryStore::new());
        store.set_filter(update(FilterField::Search, "maria"));

        let raw = store.store().get(FILTERS_STORAGE_KEY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["state"]["search"], "maria");
        assert_eq!(json["version"], 0);
    }

    #[test]
    fn loads_envelope_written_by_browser_store() {
        let mut memory = MemoryStore::new();
        memory
            .set(
                FILTERS_STORAGE_KEY,
                r#"{"state":{"clinica":"OdontoVita","unidade":"Sede","acao":null,"dataInicio":"2026-02-01","dataFim":null,"search":null},"version":0}"#,
            )
            .unwrap();

        let store = FilterStore::load(memory);
        assert_eq!(store.state().unit(), Some("Sede"));
        assert_eq!(
            store.to_query_params().get("data_inicio").map(String::as_str),
            Some("2026-02-01")
        );
    }

    #[test]
    fn write_failures_keep_in_memory_state() {
        let mut store = FilterStore::load(BrokenStore);
        let changed = store.set_filter(update(FilterField::Action, "Lembrete"));
        assert!(changed);
        assert_eq!(store.state().action(), Some("Lembrete"));
    }

    #[test]
    fn clear_filters_twice_is_same_as_once() {
        let mut store = FilterStore::load(MemoryStore::new());
        store.set_filter(update(FilterField::Clinic, "OdontoVita"));
        store.clear_filters();
        let once = store.state().clone();
        store.clear_filters();
        assert_eq!(store.state(), &once);
        assert!(store.state().is_empty());
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dir = temp.path().join("state");

        let mut store = FilterStore::load(FileStore::new(&dir));
        store.set_filter(update(FilterField::Unit, "Sede"));
        assert!(dir.join(format!("{FILTERS_STORAGE_KEY}.json")).is_file());

        let restored = FilterStore::load(FileStore::new(&dir));
        assert_eq!(restored.state().unit(), Some("Sede"));
    }

    #[test]
    fn file_store_get_missing_is_none() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp.path());
        assert_eq!(store.get("absent"), None);
    }
}
