//! Core data types shared across the review engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finding severity, ordered `critical > major > minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

/// A single changed file in a reviewed diff. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub status: FileStatus,
    pub additions: u32,
    pub deletions: u32,
    pub changes: u32,
    #[serde(default)]
    pub patch: Option<String>,
    #[serde(default)]
    pub previous_filename: Option<String>,
}

impl FileChange {
    /// Builds a change, enforcing `changes = additions + deletions`.
    pub fn new(
        filename: impl Into<String>,
        status: FileStatus,
        additions: u32,
        deletions: u32,
        patch: Option<String>,
        previous_filename: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            status,
            additions,
            deletions,
            changes: additions + deletions,
            patch,
            previous_filename,
        }
    }

    pub fn is_invariant_sound(&self) -> bool {
        self.changes == self.additions + self.deletions
    }
}

/// Immutable snapshot of the pull/merge request under review.
///
/// The core never mutates a `PRContext` in place; every filtering
/// operation (trivial-file removal, incremental narrowing) returns a new
/// value built via [`PRContext::with_files`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrContext {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub draft: bool,
    pub labels: BTreeSet<String>,
    pub files: Vec<FileChange>,
    pub diff: String,
    pub base_sha: String,
    pub head_sha: String,
}

impl PrContext {
    /// Returns a new context with `files`/`diff` replaced; everything
    /// else is carried over unchanged.
    pub fn with_files(&self, files: Vec<FileChange>, diff: String) -> Self {
        Self {
            files,
            diff,
            ..self.clone()
        }
    }

    pub fn total_changed_lines(&self) -> u32 {
        self.files.iter().map(|f| f.additions + f.deletions).sum()
    }
}

/// A single reported issue attributed to a file and line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Single originating provider, when relevant to the producer.
    #[serde(default)]
    pub provider: Option<String>,
    /// All providers/analyzers that contributed to this (possibly merged)
    /// finding.
    #[serde(default)]
    pub providers: BTreeSet<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub evidence: Option<EvidenceScore>,
    #[serde(default)]
    pub evidence_detail: Option<EvidenceDetail>,
}

impl Finding {
    /// True when this finding was produced by a local analyzer rather
    /// than an LLM provider.
    pub fn is_local(&self) -> bool {
        matches!(
            self.provider.as_deref(),
            Some("ast") | Some("security") | Some("rules")
        ) || self.provider.is_none() && self.providers.iter().all(|p| is_local_name(p))
    }
}

pub fn is_local_name(name: &str) -> bool {
    matches!(name, "ast" | "security" | "rules")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceBadge {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl EvidenceBadge {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence < 0.5 {
            EvidenceBadge::Low
        } else if confidence < 0.75 {
            EvidenceBadge::Medium
        } else if confidence < 0.9 {
            EvidenceBadge::High
        } else {
            EvidenceBadge::VeryHigh
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceScore {
    pub confidence: f32,
    pub reasoning: String,
    pub badge: EvidenceBadge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub file: String,
    pub line: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvidenceDetail {
    pub changed_lines: Vec<u32>,
    pub related_snippets: Vec<CodeSnippet>,
    pub provider_agreement: f32,
    pub ast_confirmed: bool,
    pub graph_confirmed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewMetrics {
    pub findings_count: usize,
    pub critical_count: usize,
    pub major_count: usize,
    pub minor_count: usize,
    pub cost_usd: f64,
    pub tokens_total: u64,
    pub duration_ms: u64,
    pub cache_hit: bool,
    pub providers_success: usize,
    pub providers_total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRunDetail {
    pub provider: String,
    pub status: String,
    pub duration_seconds: f64,
    #[serde(default)]
    pub tokens: Option<u64>,
}

/// Aggregate output of one orchestrator invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub findings: Vec<Finding>,
    pub metrics: ReviewMetrics,
    #[serde(default)]
    pub run_details: Vec<ProviderRunDetail>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Review {
    pub fn highest_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Exit-code semantics from the external-interfaces contract:
    /// 0 = none/minor only, 1 = at least one major, 2 = at least one
    /// critical.
    pub fn exit_code(&self) -> i32 {
        match self.highest_severity() {
            Some(Severity::Critical) => 2,
            Some(Severity::Major) => 1,
            _ => 0,
        }
    }
}

pub const CACHE_VERSION: u32 = 1;

/// Generic versioned, timestamped wrapper used by every on-disk cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEnvelope<T> {
    pub version: u32,
    pub timestamp: i64,
    pub data: T,
}

impl<T> CachedEnvelope<T> {
    pub fn wrap(data: T, now: DateTime<Utc>) -> Self {
        Self {
            version: CACHE_VERSION,
            timestamp: now.timestamp_millis(),
            data,
        }
    }

    /// Validates version and TTL; returns `None` ("miss") on any mismatch
    /// or expiry, never an error.
    pub fn unwrap_fresh(self, now: DateTime<Utc>, ttl_ms: i64) -> Option<T> {
        if self.version != CACHE_VERSION {
            return None;
        }
        if now.timestamp_millis() - self.timestamp > ttl_ms {
            return None;
        }
        Some(self.data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResultData {
    pub findings: Vec<Finding>,
    pub timestamp: i64,
}

pub type CachedResult = CachedEnvelope<CachedResultData>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalRecord {
    pub pr_number: u64,
    pub last_reviewed_commit: String,
    pub timestamp: i64,
    pub findings: Vec<Finding>,
    pub review_summary: String,
}

impl IncrementalRecord {
    pub fn cache_key(pr_number: u64) -> String {
        format!("incremental-review-pr-{pr_number}")
    }
}
