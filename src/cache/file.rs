//! File-backed cache store
//!
//! Stores each entry as a JSON file with its expiry timestamp in a cache
//! directory (`~/.cache/pitchside/` on Linux). Entries are published with a
//! hard link from a private temp file, which fails if the target exists, so a
//! reader never sees a half-written entry and only one writer can create it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use super::{CacheError, CacheResult, CacheStore};

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached value
    value: String,
    /// When the value was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn time_left(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at - now)
            .to_std()
            .ok()
            .filter(|left| !left.is_zero())
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache store keeping one JSON file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a new FileStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "pitchside")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new FileStore with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.cache_dir
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), n))
    }

    /// Reads an entry, treating a missing or unreadable file as absent
    async fn read_entry(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        read_entry_at(&self.cache_path(key), key).await
    }

    /// Links `temp` into place as the entry for `key`
    ///
    /// An existing entry is only replaced when it is expired or unreadable.
    async fn publish(&self, key: &str, temp: &Path, now: DateTime<Utc>) -> CacheResult<bool> {
        let path = self.cache_path(key);
        match fs::hard_link(temp, &path).await {
            Ok(()) => return Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(existing) = self.read_entry(key).await? {
            if existing.time_left(now).is_some() {
                return Ok(false);
            }
        }
        if !self.evict_stale(key, now).await? {
            return Ok(false);
        }

        match fs::hard_link(temp, &path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves an expired entry out of the way
    ///
    /// Returns `false` if the file moved aside turned out to be live, i.e. a
    /// concurrent writer replaced the stale entry first. That entry is linked
    /// back in place.
    async fn evict_stale(&self, key: &str, now: DateTime<Utc>) -> CacheResult<bool> {
        let path = self.cache_path(key);
        let aside = self.temp_path(key);
        match fs::rename(&path, &aside).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        }

        let live = read_entry_at(&aside, key)
            .await?
            .is_some_and(|entry| entry.time_left(now).is_some());
        if live {
            if let Err(e) = fs::hard_link(&aside, &path).await {
                if e.kind() != ErrorKind::AlreadyExists {
                    discard(&aside).await;
                    return Err(e.into());
                }
            }
            debug!(key, "Stale entry already replaced by another writer");
        }
        discard(&aside).await;
        Ok(!live)
    }
}

async fn read_entry_at(path: &Path, key: &str) -> CacheResult<Option<CacheEntry>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&content) {
        Ok(entry) => Ok(Some(entry)),
        Err(e) => {
            warn!(key, error = %e, "Ignoring unreadable cache file");
            Ok(None)
        }
    }
}

/// Removes a temp or evicted file, logging instead of failing the write
async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove cache temp file");
        }
    }
}

impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Utc::now();
        let value = self
            .read_entry(key)
            .await?
            .filter(|entry| entry.time_left(now).is_some())
            .map(|entry| entry.value);

        debug!(key, hit = value.is_some(), "Cache GET (file)");
        Ok(value)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        fs::create_dir_all(&self.cache_dir).await?;

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::SerializationError(format!("TTL out of range: {}", e)))?;
        let entry = CacheEntry {
            value: value.to_string(),
            cached_at: now,
            expires_at: now + ttl,
        };
        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let temp = self.temp_path(key);
        fs::write(&temp, json).await?;
        let published = self.publish(key, &temp, now).await;
        discard(&temp).await;
        let created = published?;

        debug!(key, created, "Cache SET NX (file)");
        Ok(created)
    }

    async fn ttl_remaining(&self, key: &str) -> CacheResult<Option<Duration>> {
        let now = Utc::now();
        Ok(self
            .read_entry(key)
            .await?
            .and_then(|entry| entry.time_left(now)))
    }

    fn provider_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_write_creates_file_in_cache_directory() {
        let (store, temp_dir) = create_test_store();

        let created = store
            .set_if_absent(
                "table-league=39-season=2023",
                r#"[{"teamId":50}]"#,
                Duration::from_secs(60),
            )
            .await
            .expect("Write should succeed");
        assert!(created);

        let expected_path = temp_dir.path().join("table-league=39-season=2023.json");
        assert!(expected_path.exists(), "Cache file should exist");

        let content = std_fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"value\""));
        assert!(content.contains("teamId"));
        assert!(content.contains("\"expires_at\""));
    }

    #[tokio::test]
    async fn test_read_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.get("nonexistent_key").await.unwrap(), None);
        assert_eq!(store.ttl_remaining("nonexistent_key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_value_survives_roundtrip() {
        let (store, _temp_dir) = create_test_store();
        let value = r#"{"matches":[],"rounds":["Round 1"]}"#;

        store.set_if_absent("k", value, Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(value.to_string()));
    }

    #[tokio::test]
    async fn test_existing_entry_is_not_overwritten() {
        let (store, _temp_dir) = create_test_store();

        assert!(store.set_if_absent("k", "first", Duration::from_secs(60)).await.unwrap());
        assert!(!store.set_if_absent("k", "second", Duration::from_secs(60)).await.unwrap());

        assert_eq!(store.get("k").await.unwrap(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_replaced() {
        let (store, _temp_dir) = create_test_store();

        store.set_if_absent("k", "old", Duration::from_millis(5)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.set_if_absent("k", "new", Duration::from_secs(60)).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_unreadable_file_counts_as_absent() {
        let (store, temp_dir) = create_test_store();
        std_fs::write(temp_dir.path().join("k.json"), "not json").expect("Should write");

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.set_if_absent("k", "v", Duration::from_secs(60)).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let store = FileStore::with_dir(nested_path.clone());

        store.set_if_absent("nested_key", "1", Duration::from_secs(60)).await.unwrap();

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let (store, temp_dir) = create_test_store();
        store.set_if_absent("k", "v", Duration::from_secs(60)).await.unwrap();
        store.set_if_absent("k", "w", Duration::from_secs(60)).await.unwrap();

        let names: Vec<String> = std_fs::read_dir(temp_dir.path())
            .expect("Should list dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_on_fresh_key_create_once() {
        let (store, _temp_dir) = create_test_store();

        for round in 0..50 {
            let key = format!("events-id={}", round);
            let writers: Vec<_> = (0..8)
                .map(|writer| {
                    let store = store.clone();
                    let key = key.clone();
                    tokio::spawn(async move {
                        let value = format!("writer-{}", writer);
                        let created = store
                            .set_if_absent(&key, &value, Duration::from_secs(60))
                            .await
                            .expect("Write should succeed");
                        (value, created)
                    })
                })
                .collect();

            let mut winners = Vec::new();
            for handle in writers {
                let (value, created) = handle.await.expect("Writer task panicked");
                if created {
                    winners.push(value);
                }
            }

            assert_eq!(winners.len(), 1, "round {}: winners {:?}", round, winners);
            assert_eq!(store.get(&key).await.unwrap(), Some(winners[0].clone()));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_keep_live_entry() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.set_if_absent("k", "first", Duration::from_secs(60)).await.unwrap());

        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .set_if_absent("k", &format!("late-{}", writer), Duration::from_secs(60))
                        .await
                        .expect("Write should succeed")
                })
            })
            .collect();

        for handle in writers {
            assert!(!handle.await.expect("Writer task panicked"));
        }
        assert_eq!(store.get("k").await.unwrap(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_evicting_a_live_entry_restores_it() {
        let (store, _temp_dir) = create_test_store();
        store.set_if_absent("k", "fresh", Duration::from_secs(60)).await.unwrap();

        // A writer that saw a stale entry earlier must not drop the live one
        let evicted = store.evict_stale("k", Utc::now()).await.expect("Should evict");

        assert!(!evicted);
        assert_eq!(store.get("k").await.unwrap(), Some("fresh".to_string()));
    }

    #[tokio::test]
    async fn test_ttl_remaining_reflects_expiry() {
        let (store, _temp_dir) = create_test_store();
        store.set_if_absent("k", "v", Duration::from_secs(3600)).await.unwrap();

        let left = store.ttl_remaining("k").await.unwrap().expect("Should have ttl");
        assert!(left > Duration::from_secs(3590) && left <= Duration::from_secs(3600));
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(store) = FileStore::new() {
            let path_str = store.cache_dir.to_string_lossy();
            assert!(path_str.contains("pitchside"), "Cache path should contain project name");
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
