use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Well-known keys shared across the portal.
pub mod keys {
    /// Bearer token, read at send time by the HTTP layer.
    pub const AUTH_TOKEN: &str = "token";
    /// RFC 3339 timestamp of the in-progress attendance session. Only a
    /// same-session reload fallback; the server stays authoritative.
    pub const CHECK_IN_TIME: &str = "checkInTime";
}

/// Local-storage analog: a tiny string key-value store shared by the token
/// and the attendance session marker. Values here are fallbacks, never the
/// source of truth.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store, used by tests and short-lived tools.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

/// File-backed store persisting entries as a flat JSON object, so a restart
/// of the agent behaves like a page reload rather than a fresh login.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    tracing::error!(error = %e, path = %self.path.display(), "Failed to persist session store");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize session store"),
        }
    }
}

impl LocalStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        self.persist(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::CHECK_IN_TIME), None);

        store.set(keys::CHECK_IN_TIME, "2024-01-20T09:00:00Z");
        assert_eq!(
            store.get(keys::CHECK_IN_TIME).as_deref(),
            Some("2024-01-20T09:00:00Z")
        );

        store.remove(keys::CHECK_IN_TIME);
        assert_eq!(store.get(keys::CHECK_IN_TIME), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "portal-store-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let store = JsonFileStore::open(&path);
            store.set(keys::AUTH_TOKEN, "abc");
        }
        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get(keys::AUTH_TOKEN).as_deref(), Some("abc"));

        let _ = std::fs::remove_file(&path);
    }
}
