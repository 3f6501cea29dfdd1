//! Finding pipeline (§4.5): dedup → consensus → evidence → quiet-mode →
//! finding-filter.

pub mod consensus;
pub mod dedup;
pub mod evidence;
pub mod finding_filter;
pub mod quiet;
pub mod sanity;

use crate::config::ReviewConfig;
use crate::graph::CodeGraph;
use crate::model::{Finding, PrContext};

/// Runs the full pipeline in order, returning the final kept findings.
/// `graph` feeds the evidence scorer's `graphConfirmed` signal; `pr`
/// supplies the diff context both the evidence scorer's `directEvidence`
/// check and the finding-filter's line/identifier rules need.
pub fn run_pipeline(
    findings: Vec<Finding>,
    config: &ReviewConfig,
    graph: Option<&CodeGraph>,
    provider_count: usize,
    pr: &PrContext,
) -> (Vec<Finding>, finding_filter::FilterStats) {
    let deduped = dedup::dedup(findings);
    let agreed = consensus::filter(deduped, config.inline_min_severity, config.inline_min_agreement);
    let enriched = evidence::enrich(agreed, graph, provider_count, pr);
    let quieted = quiet::filter(
        enriched,
        config.quiet_mode_enabled,
        config.quiet_min_confidence,
        &config.quiet_category_thresholds,
    );
    finding_filter::filter_with_context(quieted, pr)
}
