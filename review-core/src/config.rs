//! Typed configuration surface for the review engine.
//!
//! `ReviewConfig` enumerates exactly the options a caller may set (§6 of
//! the external interfaces). Parsing a config *file* is explicitly an
//! external concern; this module only validates an already-deserialized
//! value. Unknown keys are rejected by `#[serde(deny_unknown_fields)]`,
//! matching the "unknown keys are rejected at load time" design note.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ReviewConfig {
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub synthesis_model: Option<String>,
    #[serde(default)]
    pub fallback_providers: Vec<String>,
    #[serde(default)]
    pub provider_allowlist: Vec<String>,
    #[serde(default)]
    pub provider_blocklist: Vec<String>,
    #[serde(default)]
    pub provider_limit: Option<usize>,
    #[serde(default = "default_provider_retries")]
    pub provider_retries: u32,
    #[serde(default = "default_provider_max_parallel")]
    pub provider_max_parallel: usize,

    #[serde(default = "default_inline_max_comments")]
    pub inline_max_comments: usize,
    #[serde(default)]
    pub inline_min_severity: crate::model::Severity,
    #[serde(default = "default_inline_min_agreement")]
    pub inline_min_agreement: usize,

    #[serde(default)]
    pub skip_labels: Vec<String>,
    #[serde(default)]
    pub skip_drafts: bool,
    #[serde(default)]
    pub skip_bots: bool,
    #[serde(default)]
    pub min_changed_lines: u32,
    #[serde(default = "default_max_changed_files")]
    pub max_changed_files: usize,
    #[serde(default = "default_diff_max_bytes")]
    pub diff_max_bytes: usize,

    #[serde(default = "default_run_timeout_seconds")]
    pub run_timeout_seconds: u64,
    #[serde(default)]
    pub budget_max_usd: Option<f64>,

    #[serde(default = "default_true")]
    pub enable_ast_analysis: bool,
    #[serde(default = "default_true")]
    pub enable_security: bool,
    #[serde(default = "default_true")]
    pub enable_caching: bool,
    #[serde(default)]
    pub enable_test_hints: bool,
    #[serde(default)]
    pub enable_ai_detection: bool,

    #[serde(default)]
    pub incremental_enabled: bool,
    #[serde(default = "default_incremental_ttl_days")]
    pub incremental_cache_ttl_days: i64,

    #[serde(default = "default_batch_max_files")]
    pub batch_max_files: usize,
    #[serde(default)]
    pub provider_batch_overrides: BTreeMap<String, usize>,
    #[serde(default = "default_default_batch_size")]
    pub default_batch_size: usize,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default = "default_target_tokens")]
    pub target_tokens: u64,

    #[serde(default = "default_true")]
    pub graph_enabled: bool,
    #[serde(default = "default_true")]
    pub graph_cache_enabled: bool,
    #[serde(default = "default_graph_max_depth")]
    pub graph_max_depth: u32,
    #[serde(default = "default_graph_timeout_seconds")]
    pub graph_timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub skip_trivial_changes: bool,
    #[serde(default)]
    pub trivial_patterns: Vec<String>,

    #[serde(default)]
    pub path_based_intensity: bool,
    #[serde(default)]
    pub path_intensity_patterns: Vec<PathIntensityRule>,
    #[serde(default)]
    pub path_default_intensity: Intensity,

    #[serde(default)]
    pub quiet_mode_enabled: bool,
    #[serde(default = "default_quiet_min_confidence")]
    pub quiet_min_confidence: f32,
    /// Per-category threshold override, standing in for a learned
    /// feedback model's filter rate (§4.5). Empty unless a caller
    /// supplies one; no training/learning happens inside this crate —
    /// see the Open Question entry in DESIGN.md.
    #[serde(default)]
    pub quiet_category_thresholds: BTreeMap<String, f32>,

    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathIntensityRule {
    pub pattern: String,
    pub intensity: Intensity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    #[default]
    Standard,
    Thorough,
}

fn default_provider_retries() -> u32 {
    3
}
fn default_provider_max_parallel() -> usize {
    4
}
fn default_inline_max_comments() -> usize {
    20
}
fn default_inline_min_agreement() -> usize {
    1
}
fn default_max_changed_files() -> usize {
    200
}
fn default_diff_max_bytes() -> usize {
    1_000_000
}
fn default_run_timeout_seconds() -> u64 {
    300
}
fn default_incremental_ttl_days() -> i64 {
    7
}
fn default_batch_max_files() -> usize {
    50
}
fn default_default_batch_size() -> usize {
    10
}
fn default_max_batch_size() -> usize {
    25
}
fn default_target_tokens() -> u64 {
    6000
}
fn default_graph_max_depth() -> u32 {
    4
}
fn default_graph_timeout_seconds() -> u64 {
    10
}
fn default_quiet_min_confidence() -> f32 {
    0.5
}
fn default_true() -> bool {
    true
}

impl Default for ReviewConfig {
    fn default() -> Self {
        // Reuse serde's defaulting by deserializing an empty object.
        serde_json::from_value(serde_json::json!({})).expect("ReviewConfig defaults must parse")
    }
}

impl ReviewConfig {
    /// Validates invariants that don't fit naturally as serde defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider_max_parallel == 0 {
            return Err(ConfigError::invalid("providerMaxParallel", "must be > 0"));
        }
        if self.default_batch_size == 0 || self.max_batch_size == 0 {
            return Err(ConfigError::invalid(
                "defaultBatchSize/maxBatchSize",
                "must be > 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.quiet_min_confidence) {
            return Err(ConfigError::invalid(
                "quietMinConfidence",
                "must be within [0, 1]",
            ));
        }
        if self.quiet_category_thresholds.values().any(|t| !(0.0..=1.0).contains(t)) {
            return Err(ConfigError::invalid(
                "quietCategoryThresholds",
                "every threshold must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// The subset of toggles that influence findings, per §4.3 — used by
    /// [`crate::cache::result_cache::config_hash`]. Field order here does
    /// not matter; the hash stably sorts keys.
    pub fn relevant_config(&self) -> serde_json::Value {
        serde_json::json!({
            "enableAstAnalysis": self.enable_ast_analysis,
            "enableSecurity": self.enable_security,
            "enableTestHints": self.enable_test_hints,
            "enableAiDetection": self.enable_ai_detection,
            "graphEnabled": self.graph_enabled,
            "graphMaxDepth": self.graph_max_depth,
            "skipTrivialChanges": self.skip_trivial_changes,
            "trivialPatterns": self.trivial_patterns,
            "inlineMinSeverity": self.inline_min_severity,
            "inlineMinAgreement": self.inline_min_agreement,
            "pathBasedIntensity": self.path_based_intensity,
            "pathIntensityPatterns": self.path_intensity_patterns,
            "pathDefaultIntensity": self.path_default_intensity,
            "quietModeEnabled": self.quiet_mode_enabled,
            "quietMinConfidence": self.quiet_min_confidence,
            "quietCategoryThresholds": self.quiet_category_thresholds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = ReviewConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_parallel_is_invalid() {
        let mut cfg = ReviewConfig::default();
        cfg.provider_max_parallel = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_key_rejected_at_load() {
        let raw = serde_json::json!({ "notARealOption": true });
        let result: Result<ReviewConfig, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }
}
