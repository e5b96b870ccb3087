// src/store/local.rs

use std::fs;
use std::path::PathBuf;

use crate::models::order::VersionedOrder;

/// File-backed key-value mirror for order arrays.
///
/// This is the resilience branch of the order store: when the database is
/// unreachable, writes land here instead, and reads fall back to it. One
/// JSON file per scope key. Cache failures are logged and treated as an
/// absent value; they never fail the request.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn read(&self, key: &str) -> Option<VersionedOrder> {
        let path = self.path(key);
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Discarding unparsable cache file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read cache file {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &VersionedOrder) {
        if let Err(e) = self.try_write(key, value) {
            tracing::warn!("Failed to write cache file for '{}': {}", key, e);
        }
    }

    fn try_write(&self, key: &str, value: &VersionedOrder) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string(value)?;
        fs::write(self.path(key), raw)
    }

    pub fn remove(&self, key: &str) {
        let path = self.path(key);
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!("Failed to remove cache file {:?}: {}", path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> LocalCache {
        let dir = std::env::temp_dir().join(format!("study-tracker-cache-{}", uuid::Uuid::new_v4()));
        LocalCache::new(dir)
    }

    #[test]
    fn roundtrip() {
        let cache = temp_cache();
        let value = VersionedOrder {
            version: 3,
            ids: vec![7, 1, 4],
        };

        cache.write("course_order", &value);
        assert_eq!(cache.read("course_order"), Some(value));
    }

    #[test]
    fn missing_key_is_none() {
        let cache = temp_cache();
        assert_eq!(cache.read("task_order_99"), None);
    }

    #[test]
    fn remove_deletes_the_file() {
        let cache = temp_cache();
        let value = VersionedOrder {
            version: 1,
            ids: vec![1],
        };

        cache.write("user_order", &value);
        cache.remove("user_order");
        assert_eq!(cache.read("user_order"), None);
    }

    #[test]
    fn corrupt_file_is_treated_as_absent() {
        let cache = temp_cache();
        let value = VersionedOrder {
            version: 1,
            ids: vec![1],
        };
        cache.write("course_order", &value);

        let path = cache.path("course_order");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(cache.read("course_order"), None);
    }
}
