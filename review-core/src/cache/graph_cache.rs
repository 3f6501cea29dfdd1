//! Graph cache (§4.4): serialized code graph keyed by `(prNumber,
//! headSha)`, default TTL 24h.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::graph::CodeGraph;
use crate::model::CachedEnvelope;

use super::{read_json, write_json};

pub const DEFAULT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

pub fn graph_cache_key(pr_number: u64, head_sha: &str) -> String {
    format!("code-graph-{pr_number}-{head_sha}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphCacheData {
    pub graph: CodeGraph,
}

pub type GraphEnvelope = CachedEnvelope<GraphCacheData>;

pub struct GraphCache;

impl GraphCache {
    /// Reads a cached graph; any deserialization error, version
    /// mismatch, or TTL expiry returns `None` ("miss").
    pub async fn read(pr_number: u64, head_sha: &str) -> Option<CodeGraph> {
        let key = graph_cache_key(pr_number, head_sha);
        let envelope: GraphEnvelope = read_json(&key).await?;
        envelope
            .unwrap_fresh(Utc::now(), DEFAULT_TTL_MS)
            .map(|data| data.graph)
    }

    pub async fn write(
        pr_number: u64,
        head_sha: &str,
        graph: &CodeGraph,
    ) -> crate::errors::MrResult<()> {
        let key = graph_cache_key(pr_number, head_sha);
        let envelope = GraphEnvelope::wrap(
            GraphCacheData {
                graph: graph.clone(),
            },
            Utc::now(),
        );
        write_json(&key, &envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_cache_key_matches_persisted_file_contract() {
        assert_eq!(graph_cache_key(42, "abc123"), "code-graph-42-abc123");
    }
}
