//! Result cache (§4.3): content-addressed over `(baseSha, headSha,
//! configHash)`, versioned envelope with TTL.

use chrono::Utc;
use serde_json::Value;
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::config::ReviewConfig;
use crate::model::{CachedResult, CachedResultData, Finding};

use super::locks::KeyLockTable;
use super::{read_json, write_json};

pub const DEFAULT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// `sha256(stableJson(relevant_config))`, truncated to the first 16 hex
/// characters. `stableJson` recursively sorts object keys so the hash is
/// invariant under key permutation.
pub fn config_hash(config: &ReviewConfig) -> String {
    let stable = stable_json(&config.relevant_config());
    let mut hasher = Sha256::new();
    hasher.update(stable.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Canonicalizes a JSON value into a string with object keys sorted
/// recursively, so semantically-identical configs hash identically
/// regardless of field order.
fn stable_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let parts: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{:?}:{}", k, stable_json(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(stable_json).collect();
            format!("[{}]", parts.join(","))
        }
        other => other.to_string(),
    }
}

/// `"mpr-" + sha1(baseSha + ":" + headSha)[:12] + ("-" + configHash?)`.
pub fn result_cache_key(base_sha: &str, head_sha: &str, config_hash: Option<&str>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{base_sha}:{head_sha}"));
    let digest = format!("{:x}", hasher.finalize());
    match config_hash {
        Some(hash) => format!("mpr-{}-{}", &digest[..12], hash),
        None => format!("mpr-{}", &digest[..12]),
    }
}

pub struct ResultCache {
    locks: KeyLockTable,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            locks: KeyLockTable::new(),
        }
    }

    /// Reads the cached findings for `key`, or `None` on version
    /// mismatch, expiry, or any I/O/parse failure — all collapse to a
    /// miss, per §7.
    pub async fn read(&self, key: &str) -> Option<Vec<Finding>> {
        let envelope: CachedResult = read_json(key).await?;
        envelope
            .unwrap_fresh(Utc::now(), DEFAULT_TTL_MS)
            .map(|data| data.findings)
    }

    /// Writes `findings` under `key`, serialized via the per-key lock so
    /// concurrent writers never interleave.
    pub async fn write(&self, key: &str, findings: Vec<Finding>) -> crate::errors::MrResult<()> {
        let lock = self.locks.lock_for(key);
        let _guard = lock.lock().await;
        let now = Utc::now();
        let envelope = CachedResult::wrap(
            CachedResultData {
                findings,
                timestamp: now.timestamp_millis(),
            },
            now,
        );
        write_json(key, &envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_hash_is_invariant_under_key_permutation() {
        let a = serde_json::json!({ "a": 1, "b": 2 });
        let b = serde_json::json!({ "b": 2, "a": 1 });
        assert_eq!(stable_json(&a), stable_json(&b));
    }

    #[test]
    fn result_cache_key_has_expected_shape() {
        let key = result_cache_key("base123", "head456", Some("abcdef0123456789"));
        assert!(key.starts_with("mpr-"));
        assert!(key.ends_with("abcdef0123456789"));
    }

    #[test]
    fn result_cache_key_without_config_hash_has_no_trailing_segment() {
        let key = result_cache_key("base123", "head456", None);
        assert_eq!(key.matches('-').count(), 1);
    }
}
