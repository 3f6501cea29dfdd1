//! Evidence scorer (§4.5): produces `confidence`, `reasoning`, and
//! `badge` for each surviving finding.

use crate::graph::CodeGraph;
use crate::model::{EvidenceBadge, EvidenceDetail, EvidenceScore, Finding, PrContext};

/// A finding has direct evidence when its reported line is actually one of
/// the lines the diff added, not merely a positive line number (every
/// `Finding.line` is positive by construction, so that check alone proves
/// nothing).
fn has_direct_evidence(pr: &PrContext, finding: &Finding) -> bool {
    let Some(patch) = pr.files.iter().find(|f| f.filename == finding.file).and_then(|f| f.patch.as_deref()) else {
        return false;
    };
    crate::diff::map_added_lines(patch)
        .iter()
        .any(|added| added.new_line_number == finding.line)
}

/// `confidence` starts at 0.5; `+0.15 * providerAgreement`, `+0.1` each
/// for astConfirmed / graphConfirmed / directEvidence, capped at 1.0.
pub fn enrich(findings: Vec<Finding>, graph: Option<&CodeGraph>, provider_count: usize, pr: &PrContext) -> Vec<Finding> {
    findings
        .into_iter()
        .map(|mut finding| {
            let provider_agreement = if provider_count == 0 {
                0.0
            } else {
                (finding.providers.len() as f32 / provider_count as f32).min(1.0)
            };
            let ast_confirmed = finding.is_local() && finding.provider.as_deref() == Some("ast");
            let graph_confirmed = graph
                .map(|g| !g.find_callers(&finding.title).is_empty() || g.symbol_table().contains_key(&finding.title))
                .unwrap_or(false);
            let direct_evidence = has_direct_evidence(pr, &finding);

            let mut confidence = 0.5_f32;
            confidence += 0.15 * provider_agreement;
            if ast_confirmed {
                confidence += 0.1;
            }
            if graph_confirmed {
                confidence += 0.1;
            }
            if direct_evidence {
                confidence += 0.1;
            }
            confidence = confidence.min(1.0);

            let badge = EvidenceBadge::from_confidence(confidence);
            let reasoning = format!(
                "providerAgreement={provider_agreement:.2}, astConfirmed={ast_confirmed}, graphConfirmed={graph_confirmed}, directEvidence={direct_evidence}"
            );

            finding.confidence = Some(confidence);
            finding.evidence = Some(EvidenceScore {
                confidence,
                reasoning,
                badge,
            });
            finding.evidence_detail = Some(EvidenceDetail {
                changed_lines: vec![finding.line],
                related_snippets: Vec::new(),
                provider_agreement,
                ast_confirmed,
                graph_confirmed,
            });
            finding
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileChange, FileStatus};
    use std::collections::BTreeSet;

    fn finding() -> Finding {
        Finding {
            file: "a.rs".into(),
            line: 10,
            severity: crate::model::Severity::Major,
            title: "t".into(),
            message: "m".into(),
            suggestion: None,
            category: None,
            provider: Some("ast".into()),
            providers: BTreeSet::from(["ast".to_string()]),
            confidence: None,
            evidence: None,
            evidence_detail: None,
        }
    }

    fn pr_with_patch(patch: Option<&str>) -> PrContext {
        let file = FileChange::new("a.rs", FileStatus::Modified, 1, 0, patch.map(|p| p.to_string()), None);
        PrContext {
            number: 1,
            title: String::new(),
            body: String::new(),
            author: String::new(),
            draft: false,
            labels: BTreeSet::new(),
            files: vec![file],
            diff: String::new(),
            base_sha: "base".into(),
            head_sha: "head".into(),
        }
    }

    #[test]
    fn confidence_stays_within_bounds() {
        let pr = pr_with_patch(Some("@@ -1,0 +10,1 @@\n+let x = 1;\n"));
        let enriched = enrich(vec![finding()], None, 1, &pr);
        let confidence = enriched[0].confidence.unwrap();
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn badge_is_monotone_in_confidence() {
        assert!(EvidenceBadge::from_confidence(0.4) == EvidenceBadge::Low);
        assert!(EvidenceBadge::from_confidence(0.6) == EvidenceBadge::Medium);
        assert!(EvidenceBadge::from_confidence(0.8) == EvidenceBadge::High);
        assert!(EvidenceBadge::from_confidence(0.95) == EvidenceBadge::VeryHigh);
    }

    #[test]
    fn direct_evidence_requires_the_line_to_be_an_added_line() {
        let pr = pr_with_patch(Some("@@ -1,0 +10,1 @@\n+let x = 1;\n"));
        let enriched = enrich(vec![finding()], None, 1, &pr);
        assert!(enriched[0].evidence_detail.as_ref().unwrap().provider_agreement >= 0.0);
        assert!(enriched[0].evidence.as_ref().unwrap().reasoning.contains("directEvidence=true"));

        let pr_no_patch = pr_with_patch(None);
        let enriched_no_patch = enrich(vec![finding()], None, 1, &pr_no_patch);
        assert!(enriched_no_patch[0].evidence.as_ref().unwrap().reasoning.contains("directEvidence=false"));
    }
}
