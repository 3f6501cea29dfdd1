//! Quiet-mode filter (§4.5): drops findings below `quiet_min_confidence`
//! unless they're critical. When a per-category threshold is present
//! (standing in for a learned feedback model's filter rate) it replaces
//! the flat threshold for findings in that category.

use std::collections::BTreeMap;

use crate::model::{Finding, Severity};

pub fn filter(
    findings: Vec<Finding>,
    enabled: bool,
    min_confidence: f32,
    category_thresholds: &BTreeMap<String, f32>,
) -> Vec<Finding> {
    if !enabled {
        return findings;
    }
    findings
        .into_iter()
        .filter(|f| {
            if f.severity == Severity::Critical {
                return true;
            }
            let threshold = f
                .category
                .as_deref()
                .and_then(|c| category_thresholds.get(c))
                .copied()
                .unwrap_or(min_confidence);
            f.confidence.unwrap_or(1.0) >= threshold
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn finding(severity: Severity, confidence: f32) -> Finding {
        finding_with_category(severity, confidence, None)
    }

    fn finding_with_category(severity: Severity, confidence: f32, category: Option<&str>) -> Finding {
        Finding {
            file: "a.rs".into(),
            line: 1,
            severity,
            title: "t".into(),
            message: "m".into(),
            suggestion: None,
            category: category.map(|c| c.to_string()),
            provider: None,
            providers: BTreeSet::new(),
            confidence: Some(confidence),
            evidence: None,
            evidence_detail: None,
        }
    }

    #[test]
    fn drops_low_confidence_non_critical_findings() {
        let kept = filter(vec![finding(Severity::Minor, 0.2)], true, 0.5, &BTreeMap::new());
        assert!(kept.is_empty());
    }

    #[test]
    fn keeps_critical_findings_regardless_of_confidence() {
        let kept = filter(vec![finding(Severity::Critical, 0.1)], true, 0.5, &BTreeMap::new());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn disabled_quiet_mode_keeps_everything() {
        let kept = filter(vec![finding(Severity::Minor, 0.0)], false, 0.9, &BTreeMap::new());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn category_threshold_overrides_the_flat_minimum() {
        let thresholds = BTreeMap::from([("security".to_string(), 0.9)]);
        let finding = finding_with_category(Severity::Minor, 0.6, Some("security"));
        // would survive the flat 0.5 threshold but not the category's 0.9
        let kept = filter(vec![finding], true, 0.5, &thresholds);
        assert!(kept.is_empty());
    }
}
