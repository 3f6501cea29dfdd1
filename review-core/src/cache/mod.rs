//! File-based caches (§4.3, §4.4): result cache, graph cache, and
//! incremental-review store, all living under `.mpr-cache/` as
//! versioned JSON envelopes.
//!
//! Grounded on the teacher's `cache.rs` (`cache_root`, on-disk JSON
//! envelope, "large bundle" write heuristic), generalized into three
//! distinct keyed stores and given explicit TTL/version-miss semantics.

pub mod graph_cache;
pub mod incremental;
pub mod result_cache;

use std::path::PathBuf;

/// Root directory for all on-disk caches (env-overridable, defaults to
/// `.mpr-cache` per the persisted-file contract in §6).
pub fn cache_root() -> PathBuf {
    std::env::var("MPR_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".mpr-cache"))
}

pub fn key_path(key: &str) -> PathBuf {
    cache_root().join(format!("{key}.json"))
}

/// Serializes `value` as an on-disk cache entry. Kept as a write-through
/// disk write for all keys; a prior "only large diffs" heuristic is no
/// longer needed at this layer since the orchestrator decides whether to
/// write at all (trivial/skip outcomes simply never call this).
pub async fn write_json<T: serde::Serialize>(key: &str, value: &T) -> crate::errors::MrResult<()> {
    let path = key_path(key);
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Reads and deserializes a cache entry, returning `None` on any I/O or
/// parse failure (a "miss" per §7 — cache corruption is never fatal).
pub async fn read_json<T: serde::de::DeserializeOwned>(key: &str) -> Option<T> {
    let path = key_path(key);
    let bytes = tokio::fs::read(&path).await.ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Per-key write serialization: a tiny in-process lock table keyed by
/// cache key name, so concurrent writers to the same key never produce a
/// half-written file. Readers take no lock — envelope versioning defends
/// against torn reads, matching the concurrency model in §5.
pub mod locks {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Mutex as AsyncMutex;

    #[derive(Default)]
    pub struct KeyLockTable {
        locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    }

    impl KeyLockTable {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lock_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
            let mut locks = self.locks.lock().expect("lock table poisoned");
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        }
    }
}
