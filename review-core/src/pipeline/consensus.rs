//! Consensus engine (§4.5): keeps findings that meet a minimum severity
//! and a minimum number of agreeing providers. Locally-produced findings
//! (`ast`, `security`, `rules`) bypass the agreement threshold.

use crate::model::{Finding, Severity};

pub fn filter(findings: Vec<Finding>, min_severity: Severity, min_agreement: usize) -> Vec<Finding> {
    findings
        .into_iter()
        .filter(|f| f.severity >= min_severity)
        .filter(|f| f.is_local() || f.providers.len() >= min_agreement)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn finding(severity: Severity, providers: &[&str]) -> Finding {
        Finding {
            file: "a.rs".into(),
            line: 1,
            severity,
            title: "t".into(),
            message: "m".into(),
            suggestion: None,
            category: None,
            provider: providers.first().map(|p| p.to_string()),
            providers: providers.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
            confidence: None,
            evidence: None,
            evidence_detail: None,
        }
    }

    #[test]
    fn filters_by_min_severity() {
        let findings = vec![finding(Severity::Minor, &["p1", "p2"]), finding(Severity::Critical, &["p1", "p2"])];
        let kept = filter(findings, Severity::Major, 2);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].severity, Severity::Critical);
    }

    #[test]
    fn local_analyzer_findings_bypass_agreement_threshold() {
        let findings = vec![finding(Severity::Major, &["ast"])];
        let kept = filter(findings, Severity::Minor, 2);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn llm_findings_need_minimum_agreement() {
        let findings = vec![finding(Severity::Major, &["openai"])];
        let kept = filter(findings, Severity::Minor, 2);
        assert!(kept.is_empty());
    }
}
