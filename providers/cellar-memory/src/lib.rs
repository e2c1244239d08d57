use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use cellar_spec::{Error, Result, SecretPath, SecretRecord, SecretStorage};
use fs2::FileExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_PERSIST_PATH: &str = ".cellar.secrets.env";
const PERSIST_ENV: &str = "CELLAR_MEMORY_PATH";
const ENV_KEY: &str = "CELLAR_MEMORY_STATE";

#[derive(Clone, Default)]
struct State {
    entries: BTreeMap<String, SecretRecord>,
}

#[derive(Clone)]
struct Persistence {
    path: PathBuf,
}

impl Persistence {
    fn load(path: PathBuf) -> Result<(State, Self)> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| Error::Storage(err.to_string()))?;

        file.lock_exclusive()
            .map_err(|err| Error::Storage(err.to_string()))?;

        let result = (|| -> Result<State> {
            let reader = BufReader::new(&file);
            for line in reader.lines() {
                let line = line.map_err(|err| Error::Storage(err.to_string()))?;
                if line.trim().is_empty() || line.starts_with('#') {
                    continue;
                }

                if let Some((key, value)) = line.split_once('=') {
                    if key.trim() == ENV_KEY {
                        let decoded = STANDARD_NO_PAD
                            .decode(value.trim())
                            .map_err(|err| Error::Storage(err.to_string()))?;
                        let persisted: PersistedState = serde_json::from_slice(&decoded)
                            .map_err(|err| Error::Storage(err.to_string()))?;
                        return Ok(persisted.into_state());
                    }
                }
            }
            Ok(State::default())
        })();

        let _ = fs2::FileExt::unlock(&file);
        result.map(|state| (state, Self { path }))
    }

    fn persist(&self, state: &State) -> Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|err| Error::Storage(err.to_string()))?;

        file.lock_exclusive()
            .map_err(|err| Error::Storage(err.to_string()))?;

        let persisted = PersistedState::from_state(state);
        let json = serde_json::to_vec(&persisted).map_err(|err| Error::Storage(err.to_string()))?;
        let encoded = STANDARD_NO_PAD.encode(json);

        let mut writer = BufWriter::new(&file);
        writer
            .write_all(format!("{ENV_KEY}={encoded}\n").as_bytes())
            .map_err(|err| Error::Storage(err.to_string()))?;
        writer
            .flush()
            .map_err(|err| Error::Storage(err.to_string()))?;

        let _ = fs2::FileExt::unlock(&file);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    secrets: Vec<SecretRecord>,
}

impl PersistedState {
    fn from_state(state: &State) -> Self {
        let secrets = state.entries.values().cloned().collect();
        Self { secrets }
    }

    fn into_state(self) -> State {
        let mut entries = BTreeMap::new();
        for record in self.secrets {
            entries.insert(record.path().as_str().to_string(), record);
        }
        State { entries }
    }
}

/// In-memory storage collaborator with optional .env persistence.
///
/// Whole-record overwrite on `put`; `delete` destroys. Cloning shares the
/// underlying state.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    persistence: Option<Persistence>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Construct a purely in-memory store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            persistence: None,
        }
    }

    /// Construct a store that persists state to the specified .env file.
    pub fn with_persistence<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let (state, persistence) = Persistence::load(path)?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            persistence: Some(persistence),
        })
    }

    /// Construct from environment configuration. If no file is configured
    /// and the default file does not exist, the store stays in-memory.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(PERSIST_ENV) {
            return Self::with_persistence(PathBuf::from(path));
        }

        let default_path = PathBuf::from(DEFAULT_PERSIST_PATH);
        if default_path.exists() {
            Self::with_persistence(default_path)
        } else {
            Ok(Self::new())
        }
    }

    fn persist_if_needed(&self, state: State) -> Result<()> {
        if let Some(persistence) = &self.persistence {
            persistence.persist(&state)?;
        }
        Ok(())
    }
}

impl SecretStorage for MemoryStore {
    fn get(&self, path: &SecretPath) -> Result<Option<SecretRecord>> {
        let state = self.state.read();
        Ok(state.entries.get(path.as_str()).cloned())
    }

    fn put(&self, record: SecretRecord) -> Result<()> {
        let key = record.path().as_str().to_string();
        let mut state_guard = self.state.write();
        state_guard.entries.insert(key, record);

        let snapshot = if self.persistence.is_some() {
            Some(state_guard.clone())
        } else {
            None
        };
        drop(state_guard);

        if let Some(state) = snapshot {
            self.persist_if_needed(state)?;
        }

        Ok(())
    }

    fn delete(&self, path: &SecretPath) -> Result<Option<SecretRecord>> {
        let mut state_guard = self.state.write();
        let removed = state_guard.entries.remove(path.as_str());

        let snapshot = if removed.is_some() && self.persistence.is_some() {
            Some(state_guard.clone())
        } else {
            None
        };
        drop(state_guard);

        if let Some(state) = snapshot {
            self.persist_if_needed(state)?;
        }

        Ok(removed)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let state = self.state.read();
        Ok(state
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &SecretPath) -> Result<bool> {
        let state = self.state.read();
        Ok(state.entries.contains_key(path.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(path: &str, key: &str, value: &str) -> SecretRecord {
        let mut attributes = BTreeMap::new();
        attributes.insert(key.to_string(), json!(value));
        SecretRecord::new(SecretPath::parse(path).expect("path"), attributes).expect("record")
    }

    #[test]
    fn put_get_round_trip() {
        let store = MemoryStore::new();
        let path = SecretPath::parse("test/").expect("path");

        store.put(record("test/", "secret_key", "secret_value")).expect("put");

        let stored = store.get(&path).expect("get").expect("record");
        assert_eq!(stored.attribute("secret_key"), Some(&json!("secret_value")));
    }

    #[test]
    fn put_replaces_the_whole_record() {
        let store = MemoryStore::new();
        let path = SecretPath::parse("test/").expect("path");

        store.put(record("test/", "old_key", "old_value")).expect("put");
        store.put(record("test/", "new_key", "new_value")).expect("put");

        let stored = store.get(&path).expect("get").expect("record");
        assert_eq!(stored.attribute("old_key"), None);
        assert_eq!(stored.attribute("new_key"), Some(&json!("new_value")));
    }

    #[test]
    fn delete_destroys_and_reports() {
        let store = MemoryStore::new();
        let path = SecretPath::parse("test/").expect("path");

        store.put(record("test/", "secret_key", "secret_value")).expect("put");
        assert!(store.exists(&path).expect("exists"));

        let removed = store.delete(&path).expect("delete").expect("removed");
        assert_eq!(removed.attribute("secret_key"), Some(&json!("secret_value")));

        assert!(!store.exists(&path).expect("exists"));
        assert!(store.get(&path).expect("get").is_none());
        assert!(store.delete(&path).expect("delete").is_none());
    }

    #[test]
    fn list_filters_by_prefix() {
        let store = MemoryStore::new();

        store.put(record("test/key1", "a", "1")).expect("put");
        store.put(record("test/key2", "b", "2")).expect("put");
        store.put(record("other/key3", "c", "3")).expect("put");

        let keys = store.list("test/").expect("list");
        assert_eq!(keys, vec!["test/key1", "test/key2"]);

        for key in store.list("other/").expect("list") {
            assert!(key.starts_with("other/"));
        }
    }
}
