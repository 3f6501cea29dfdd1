//! Review orchestrator (§4.9): the top-level conductor. Calls every
//! other component in the fixed order the spec lays out and is the only
//! place in the crate that creates concurrency.
//!
//! Grounded on the teacher's `lib.rs::run_review` staging/logging style
//! (`step1:`/`step2:`-prefixed `tracing::debug!` calls) and
//! `review/mod.rs::build_draft_comments`'s sequencing of local analysis,
//! LLM dispatch, and dedup/policy application.

pub mod intensity;
pub mod skip;
pub mod trivial;

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::batch::plan_batches;
use crate::cache::graph_cache::GraphCache;
use crate::cache::incremental::{get_changed_files_since, IncrementalStore};
use crate::cache::result_cache::{config_hash, result_cache_key, ResultCache};
use crate::config::ReviewConfig;
use crate::diff::filter_diff_by_files;
use crate::errors::Error;
use crate::graph::CodeGraph;
use crate::llm::executor::{execute, filter_healthy_providers, CostTracker, ExecutorConfig};
use crate::model::{IncrementalRecord, PrContext, ProviderRunDetail, Review, ReviewMetrics, Severity};
use crate::pipeline::run_pipeline;
use crate::providers::{Provider, ProviderResult, ProviderStatus};
use crate::reliability::{Outcome, ReliabilityTracker};

#[derive(Debug)]
pub enum ReviewOutcome {
    Completed(Review),
    Skipped(String),
}

/// Runs one full review. Only `Config`/`Budget`/`InvalidBatchSize`
/// bubble out as `Err`; every other recoverable failure is absorbed and
/// surfaced as a logged warning or a status field, so the core has
/// exactly three terminal outcomes: completed, skipped, or fatal error.
pub async fn run_review<F, Fut>(
    pr: PrContext,
    config: ReviewConfig,
    providers: Vec<Provider>,
    reliability: &ReliabilityTracker,
    list_changed_files: F,
) -> Result<ReviewOutcome, Error>
where
    F: FnOnce(String, String) -> Fut,
    Fut: Future<Output = Result<Vec<String>, Error>>,
{
    config.validate()?;
    let start = std::time::Instant::now();

    // Step 1: skip gating.
    if let Some(reason) = skip::skip_reason(&pr, &config) {
        debug!(reason = %reason, "skip: gated before review started");
        return Ok(ReviewOutcome::Skipped(reason));
    }

    // Step 2: trivial detection.
    let Some(non_trivial_files) = trivial::filter_non_trivial(&pr.files, &config) else {
        debug!("trivial: every changed file is trivial, returning a canned review");
        return Ok(ReviewOutcome::Completed(canned_trivial_review()));
    };
    let review_diff = filter_diff_by_files(
        &pr.diff,
        &non_trivial_files.iter().map(|f| f.filename.clone()).collect::<Vec<_>>(),
    );
    let mut review_pr = pr.with_files(non_trivial_files, review_diff);

    // Step 3: intensity classification (logged only; prompt depth and
    // provider count are chosen by the external collaborator that builds
    // prompts, which this core does not own).
    for file in &review_pr.files {
        let level = intensity::classify(&file.filename, &config);
        debug!(file = %file.filename, intensity = ?level, "intensity: classified");
    }

    // Step 4: graph build / incremental update, with cache read.
    let graph = if config.graph_enabled {
        let cached = if config.graph_cache_enabled {
            GraphCache::read(pr.number, &pr.head_sha).await
        } else {
            None
        };
        match cached {
            Some(graph) => {
                debug!("graph: cache hit");
                Some(graph)
            }
            None => {
                let mut graph = CodeGraph::new();
                graph.update(&review_pr.files);
                if config.graph_cache_enabled {
                    if let Err(e) = GraphCache::write(pr.number, &pr.head_sha, &graph).await {
                        warn!(error = %e, "graph: cache write failed, continuing without persisting");
                    }
                }
                Some(graph)
            }
        }
    } else {
        None
    };

    // Step 5: incremental decision.
    let prior_record = if config.incremental_enabled {
        IncrementalStore::read(pr.number).await
    } else {
        None
    };
    let use_incremental = config.incremental_enabled
        && IncrementalStore::should_use_incremental(&review_pr, prior_record.as_ref(), config.incremental_cache_ttl_days);

    let mut changed_since: Option<Vec<String>> = None;
    if use_incremental {
        if let Some(record) = &prior_record {
            let files = get_changed_files_since(&review_pr, &record.last_reviewed_commit, list_changed_files).await;
            let narrowed: Vec<_> = review_pr
                .files
                .iter()
                .filter(|f| files.contains(&f.filename))
                .cloned()
                .collect();
            let narrowed_diff = filter_diff_by_files(&review_pr.diff, &files);
            review_pr = review_pr.with_files(narrowed, narrowed_diff);
            changed_since = Some(files);
        }
    }

    let files_to_review: Vec<String> = review_pr.files.iter().map(|f| f.filename.clone()).collect();

    // Step 6: LLM phase.
    let healthcheck_timeout = Duration::from_secs(5);
    let (healthy_providers, health_results) = filter_healthy_providers(providers, healthcheck_timeout).await;
    for (name, is_healthy) in &health_results {
        reliability.record(
            name,
            Outcome {
                success: *is_healthy,
                latency_ms: 0,
                error_message: if *is_healthy { None } else { Some("health check failed".to_string()) },
            },
        );
    }

    let provider_names: Vec<String> = healthy_providers.iter().map(|p| p.name().to_string()).collect();
    let mut run_details: Vec<ProviderRunDetail> = Vec::new();
    let mut llm_findings = Vec::new();
    let cost_tracker = CostTracker::new(config.budget_max_usd);
    let mut budget_error = None;

    if !healthy_providers.is_empty() {
        let batch_plan = plan_batches(&review_pr.files, config.target_tokens, config.batch_max_files);
        debug!(batches = batch_plan.batches.len(), reason = %batch_plan.reason, "batch: plan computed");

        let executor_config = ExecutorConfig {
            provider_max_parallel: config.provider_max_parallel,
            run_timeout: Duration::from_secs(config.run_timeout_seconds),
            provider_retries: config.provider_retries,
            price_per_1k_tokens: Default::default(),
        };

        for batch in &batch_plan.batches {
            let prompt = format!(
                "Review the following {} file(s): {}",
                batch.files.len(),
                batch.files.iter().map(|f| f.filename.clone()).collect::<Vec<_>>().join(", ")
            );
            let (results, err) = execute(healthy_providers.clone(), prompt, &executor_config, &cost_tracker).await;
            record_provider_outcomes(reliability, &results);
            for result in &results {
                run_details.push(ProviderRunDetail {
                    provider: result.name.clone(),
                    status: format!("{:?}", result.status),
                    duration_seconds: result.duration_seconds,
                    tokens: result.result.as_ref().and_then(|r| r.usage_tokens),
                });
                if let Some(body) = &result.result {
                    if let Some(findings) = &body.findings {
                        llm_findings.extend(findings.clone());
                    }
                }
            }
            if err.is_some() {
                budget_error = err;
                break;
            }
        }
    } else {
        debug!("llm: no healthy providers, proceeding with zero LLM findings");
    }

    let budget_exceeded = budget_error.is_some();
    if let Some(e) = &budget_error {
        warn!(error = %e, "budget: aborting further batches, returning partial review from batches already completed");
    }

    // Step 7: static phase.
    let mut findings = crate::analyzers::run_static_analyzers(&review_pr, &files_to_review, &config);
    findings.extend(llm_findings);

    // Step 8: pipeline.
    let (mut kept, _stats) = run_pipeline(findings, &config, graph.as_ref(), provider_names.len().max(1), &review_pr);

    // Step 9: merge with prior (incremental only).
    let mut summary = None;
    if use_incremental {
        if let (Some(record), Some(changed)) = (&prior_record, &changed_since) {
            let mut merged: Vec<_> = record
                .findings
                .iter()
                .filter(|f| !changed.contains(&f.file))
                .cloned()
                .collect();
            merged.extend(kept);
            kept = merged;
            summary = Some(format!(
                "incremental review {} -> {}: re-examined {}",
                record.last_reviewed_commit,
                pr.head_sha,
                changed.join(", ")
            ));
        }
    }

    if budget_exceeded {
        summary = Some(match summary {
            Some(existing) => format!("{existing}; budget exceeded, remaining batches skipped"),
            None => "budget exceeded, remaining batches skipped".to_string(),
        });
    }

    // Step 10: persist & emit.
    let metrics = build_metrics(&kept, start.elapsed(), &run_details, cost_tracker.total());
    let review = Review {
        findings: kept,
        metrics,
        run_details,
        summary,
    };

    if config.enable_caching && !config.dry_run {
        let hash = config_hash(&config);
        let key = result_cache_key(&pr.base_sha, &pr.head_sha, Some(&hash));
        let result_cache = ResultCache::new();
        if let Err(e) = result_cache.write(&key, review.findings.clone()).await {
            warn!(error = %e, "persist: result cache write failed");
        }

        if config.incremental_enabled {
            let record = IncrementalRecord {
                pr_number: pr.number,
                last_reviewed_commit: pr.head_sha.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
                findings: review.findings.clone(),
                review_summary: review.summary.clone().unwrap_or_default(),
            };
            if let Err(e) = IncrementalStore::write(&record).await {
                warn!(error = %e, "persist: incremental record write failed");
            }
        }
    }

    Ok(ReviewOutcome::Completed(review))
}

fn record_provider_outcomes(reliability: &ReliabilityTracker, results: &[ProviderResult]) {
    for result in results {
        reliability.record(
            &result.name,
            Outcome {
                success: result.status == ProviderStatus::Success,
                latency_ms: (result.duration_seconds * 1000.0) as u64,
                error_message: result.error.clone(),
            },
        );
    }
}

fn build_metrics(
    findings: &[crate::model::Finding],
    duration: std::time::Duration,
    run_details: &[ProviderRunDetail],
    cost_usd: f64,
) -> ReviewMetrics {
    ReviewMetrics {
        findings_count: findings.len(),
        critical_count: findings.iter().filter(|f| f.severity == Severity::Critical).count(),
        major_count: findings.iter().filter(|f| f.severity == Severity::Major).count(),
        minor_count: findings.iter().filter(|f| f.severity == Severity::Minor).count(),
        cost_usd,
        tokens_total: run_details.iter().filter_map(|d| d.tokens).sum(),
        duration_ms: duration.as_millis() as u64,
        cache_hit: false,
        providers_success: run_details.iter().filter(|d| d.status == "Success").count(),
        providers_total: run_details.len(),
    }
}

fn canned_trivial_review() -> Review {
    Review {
        findings: Vec::new(),
        metrics: ReviewMetrics::default(),
        run_details: Vec::new(),
        summary: Some("trivial review: every changed file was classified as trivial".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileChange, FileStatus};
    use crate::providers::MockProviderConfig;
    use std::collections::BTreeSet;

    fn pr(files: Vec<FileChange>) -> PrContext {
        PrContext {
            number: 123,
            title: "t".into(),
            body: "b".into(),
            author: "alice".into(),
            draft: false,
            labels: BTreeSet::new(),
            files,
            diff: String::new(),
            base_sha: "base".into(),
            head_sha: "head".into(),
        }
    }

    async fn no_vcs(_from: String, _to: String) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    #[tokio::test]
    async fn all_trivial_files_yields_canned_review() {
        let mut config = ReviewConfig::default();
        config.enable_caching = false;
        let files = vec![FileChange::new("Cargo.lock", FileStatus::Modified, 1, 1, None, None)];
        let reliability = ReliabilityTracker::new(Duration::from_secs(30));
        let outcome = run_review(pr(files), config, vec![], &reliability, no_vcs).await.unwrap();
        match outcome {
            ReviewOutcome::Completed(review) => assert!(review.findings.is_empty()),
            ReviewOutcome::Skipped(_) => panic!("expected a completed trivial review"),
        }
    }

    #[tokio::test]
    async fn draft_pr_is_skipped_when_configured() {
        let mut config = ReviewConfig::default();
        config.skip_drafts = true;
        config.enable_caching = false;
        let mut p = pr(vec![FileChange::new("src/lib.rs", FileStatus::Modified, 10, 0, None, None)]);
        p.draft = true;
        let reliability = ReliabilityTracker::new(Duration::from_secs(30));
        let outcome = run_review(p, config, vec![], &reliability, no_vcs).await.unwrap();
        assert!(matches!(outcome, ReviewOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn runs_full_review_with_no_healthy_providers() {
        let mut config = ReviewConfig::default();
        config.enable_caching = false;
        let patch = "@@ -1,0 +1,1 @@\n+let x = 1;\n";
        let files = vec![FileChange::new("src/lib.rs", FileStatus::Modified, 1, 0, Some(patch.to_string()), None)];
        let providers = vec![Provider::Mock(MockProviderConfig {
            name: "mock".into(),
            canned_response: String::new(),
            healthy: false,
        })];
        let reliability = ReliabilityTracker::new(Duration::from_secs(30));
        let outcome = run_review(pr(files), config, providers, &reliability, no_vcs).await.unwrap();
        match outcome {
            ReviewOutcome::Completed(review) => assert_eq!(review.metrics.providers_success, 0),
            ReviewOutcome::Skipped(_) => panic!("expected a completed review"),
        }
    }

    #[tokio::test]
    async fn healthy_mock_provider_contributes_a_successful_run_detail() {
        let mut config = ReviewConfig::default();
        config.enable_caching = false;
        let patch = "@@ -1,0 +1,1 @@\n+let x = 1;\n";
        let files = vec![FileChange::new("src/lib.rs", FileStatus::Modified, 1, 0, Some(patch.to_string()), None)];
        let providers = vec![Provider::Mock(MockProviderConfig {
            name: "mock".into(),
            canned_response: "no findings".into(),
            healthy: true,
        })];
        let reliability = ReliabilityTracker::new(Duration::from_secs(30));
        let outcome = run_review(pr(files), config, providers, &reliability, no_vcs).await.unwrap();
        match outcome {
            ReviewOutcome::Completed(review) => assert_eq!(review.metrics.providers_success, 1),
            ReviewOutcome::Skipped(_) => panic!("expected a completed review"),
        }
    }
}
