use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Cached catalog entry with timestamp
struct CachedEntry {
    value: serde_json::Value,
    timestamp: SystemTime,
}

/// Cache for catalog lookups (water bodies, countries, ports, ocean regions).
///
/// Entries live in memory and are mirrored to JSON files in the cache
/// directory so a restart within the TTL skips the backend.
pub struct CatalogCache {
    cache_dir: PathBuf,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl CatalogCache {
    pub fn new(cache_dir: Option<PathBuf>, ttl: Duration) -> Self {
        let cache_dir = cache_dir.unwrap_or_else(default_cache_dir);

        // Create cache directory if it doesn't exist
        if let Err(e) = std::fs::create_dir_all(&cache_dir) {
            warn!(path = ?cache_dir, error = %e, "Failed to create cache directory");
        }

        debug!(path = ?cache_dir, ttl_secs = ttl.as_secs(), "Initialized catalog cache");

        Self {
            cache_dir,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn is_fresh(&self, timestamp: SystemTime) -> bool {
        timestamp.elapsed().unwrap_or(self.ttl) < self.ttl
    }

    /// Get a cached value if still valid
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(key) {
                if self.is_fresh(entry.timestamp) {
                    debug!(key, "Using cached catalog entry");
                    return serde_json::from_value(entry.value.clone()).ok();
                }
            }
        }

        let entry = self.load_file(key)?;
        let value = serde_json::from_value(entry.value.clone()).ok()?;
        debug!(key, "Loaded catalog entry from disk");
        self.entries.write().insert(key.to_string(), entry);
        Some(value)
    }

    /// Store a value in memory and on disk
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize catalog entry");
                return;
            }
        };

        let path = self.cache_file(key);
        match serde_json::to_vec(&value) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&path, bytes) {
                    warn!(path = ?path, error = %e, "Failed to write catalog cache file");
                }
            }
            Err(e) => warn!(key, error = %e, "Failed to encode catalog entry"),
        }

        debug!(key, "Caching catalog entry");
        self.entries.write().insert(
            key.to_string(),
            CachedEntry {
                value,
                timestamp: SystemTime::now(),
            },
        );
    }

    /// Clear all entries, in memory and on disk
    pub fn clear(&self) {
        debug!("Clearing catalog cache");
        let keys: Vec<String> = self.entries.write().drain().map(|(k, _)| k).collect();
        for key in keys {
            let _ = std::fs::remove_file(self.cache_file(&key));
        }
    }

    fn load_file(&self, key: &str) -> Option<CachedEntry> {
        let path = self.cache_file(key);
        let timestamp = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        if !self.is_fresh(timestamp) {
            return None;
        }
        let bytes = std::fs::read(&path).ok()?;
        let value = serde_json::from_slice(&bytes).ok()?;
        Some(CachedEntry { value, timestamp })
    }

    /// Get path for a cache file
    pub fn cache_file(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{name}.json"))
    }
}

/// `~/.cache/seachart` or `./seachart` when no cache dir is known
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seachart")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60));

        cache.set("water_bodies", &vec!["Baltic Sea", "North Sea"]);
        let cached: Option<Vec<String>> = cache.get("water_bodies");
        assert_eq!(cached, Some(vec!["Baltic Sea".to_string(), "North Sea".to_string()]));
        assert!(cache.cache_file("water_bodies").exists());
    }

    #[test]
    fn test_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let first = CatalogCache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60));
        first.set("countries/North Sea", &vec!["NL", "DE"]);

        let second = CatalogCache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60));
        let cached: Option<Vec<String>> = second.get("countries/North Sea");
        assert_eq!(cached, Some(vec!["NL".to_string(), "DE".to_string()]));
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(Some(dir.path().to_path_buf()), Duration::ZERO);
        cache.set("ocean_regions", &vec![1, 2, 3]);
        assert_eq!(cache.get::<Vec<u32>>("ocean_regions"), None);
    }

    #[test]
    fn test_clear_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CatalogCache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60));
        cache.set("water_bodies", &vec!["Red Sea"]);
        cache.clear();

        assert!(!cache.cache_file("water_bodies").exists());
        assert_eq!(cache.get::<Vec<String>>("water_bodies"), None);
    }

    #[test]
    fn test_cache_file_name_is_sanitized() {
        let cache = CatalogCache::new(Some(std::env::temp_dir()), Duration::from_secs(1));
        let path = cache.cache_file("ports/South China Sea/CN");
        assert_eq!(path.file_name().unwrap(), "ports_South_China_Sea_CN.json");
    }
}
