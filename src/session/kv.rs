// src/session/kv.rs — String key-value capability behind the session store
//
// `MemoryStore` backs tests; `FileStore` persists a flat JSON object that
// survives restarts until keys are removed. Writes are atomic (temp file +
// rename) and the file is chmod 600 on Unix since it holds a bearer token.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::infra::errors::SelfcareError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SelfcareError>;

    fn set(&self, key: &str, value: &str) -> Result<(), SelfcareError>;

    fn remove(&self, key: &str) -> Result<(), SelfcareError>;

    /// Write several keys so that readers see all of them or none.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SelfcareError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), SelfcareError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─── In-memory ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SelfcareError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SelfcareError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SelfcareError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SelfcareError> {
        let mut map = lock(&self.entries);
        for (k, v) in entries {
            map.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), SelfcareError> {
        let mut map = lock(&self.entries);
        for k in keys {
            map.remove(*k);
        }
        Ok(())
    }
}

// ─── File-backed ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, SelfcareError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), SelfcareError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), SelfcareError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _held = lock(&self.guard);
        // An unreadable file is replaced rather than blocking every write
        let (mut map, discarded) = match self.read_map() {
            Ok(map) => (map, false),
            Err(SelfcareError::Json(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Discarding unreadable session file: {e}"
                );
                (BTreeMap::new(), true)
            }
            Err(e) => return Err(e),
        };
        if f(&mut map) || discarded {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SelfcareError> {
        let _held = lock(&self.guard);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SelfcareError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), SelfcareError> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SelfcareError> {
        self.update(|map| {
            for (k, v) in entries {
                map.insert(k.to_string(), v.to_string());
            }
            true
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), SelfcareError> {
        self.update(|map| {
            let mut changed = false;
            for k in keys {
                changed |= map.remove(*k).is_some();
            }
            changed
        })
    }
}
