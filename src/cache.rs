use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::ResolvedMetadata;

/// Durable metadata cache keyed by normalized DOI, with sliding expiry.
///
/// The cache is an optimization, never a correctness dependency: read
/// failures degrade to a miss, write failures to a no-op, both logged.
pub struct MetadataCache {
    dir: PathBuf,
    ttl: Duration,
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    /// Unix timestamp secs.
    created_at: i64,
    /// Unix timestamp secs; refreshed by every successful read.
    last_accessed: i64,
    value: ResolvedMetadata,
}

fn cache_key_to_path(dir: &Path, key: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();
    dir.join(format!("{hash:016x}.json"))
}

fn now_secs() -> i64 {
    Utc::now().timestamp()
}

impl MetadataCache {
    /// Open (creating if needed) the cache under the default data directory.
    pub fn new(ttl: Duration) -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("recite")
            .join("cache")
            .join("metadata");
        Self::at(dir, ttl)
    }

    pub fn at(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "failed to create cache directory");
        }
        Self { dir, ttl }
    }

    /// Look up metadata for a normalized DOI. A hit refreshes the entry's
    /// last-accessed timestamp before returning (sliding expiry).
    pub async fn get(&self, key: &str) -> Option<ResolvedMetadata> {
        let path = cache_key_to_path(&self.dir, key);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };
        let mut entry: CacheEntry = match serde_json::from_slice(&data) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "cache entry corrupt, treating as miss");
                let _ = tokio::fs::remove_file(&path).await;
                return None;
            }
        };

        let now = now_secs();
        if now.saturating_sub(entry.last_accessed) > self.ttl.as_secs() as i64 {
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }

        entry.last_accessed = now;
        if let Ok(refreshed) = serde_json::to_vec(&entry)
            && let Err(e) = tokio::fs::write(&path, refreshed).await
        {
            warn!(key, error = %e, "failed to refresh cache access time");
        }
        Some(entry.value)
    }

    /// Upsert metadata for a normalized DOI.
    pub async fn set(&self, key: &str, value: &ResolvedMetadata) {
        let path = cache_key_to_path(&self.dir, key);
        let now = now_secs();
        let entry = CacheEntry {
            created_at: now,
            last_accessed: now,
            value: value.clone(),
        };
        match serde_json::to_vec(&entry) {
            Ok(data) => {
                if let Err(e) = tokio::fs::write(&path, data).await {
                    warn!(key, error = %e, "cache write failed, skipping");
                }
            }
            Err(e) => warn!(key, error = %e, "cache serialization failed, skipping"),
        }
    }

    /// Remove every entry whose last access is older than the TTL.
    /// Safe to run alongside concurrent gets and sets.
    pub async fn evict_expired(&self) {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "cache eviction scan failed");
                return;
            }
        };
        let now = now_secs();
        while let Ok(Some(file)) = dir.next_entry().await {
            let path = file.path();
            let Ok(data) = tokio::fs::read(&path).await else {
                continue;
            };
            match serde_json::from_slice::<CacheEntry>(&data) {
                Ok(entry) if now.saturating_sub(entry.last_accessed) > self.ttl.as_secs() as i64 => {
                    let _ = tokio::fs::remove_file(&path).await;
                }
                Ok(_) => {}
                // Unparseable files are stale debris from older versions.
                Err(_) => {
                    let _ = tokio::fs::remove_file(&path).await;
                }
            }
        }
    }
}
