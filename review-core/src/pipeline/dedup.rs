//! Deduplicator (§4.5): groups findings by `(file, line)` and a
//! normalized title/message bucket; the representative keeps the highest
//! severity, the union of providers, and the longest suggestion that
//! passes the sanity check.

use std::collections::BTreeMap;

use crate::model::Finding;

use super::sanity::sanitize_suggestion;

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .take(12)
        .collect::<Vec<_>>()
        .join(" ")
}

fn bucket_key(finding: &Finding) -> (String, u32, String) {
    let bucket = if !finding.title.is_empty() {
        normalize(&finding.title)
    } else {
        normalize(&finding.message)
    };
    (finding.file.clone(), finding.line, bucket)
}

/// Groups findings into dedup buckets and merges each bucket into a
/// single representative. Order-insensitive up to representative choice;
/// idempotent (`dedup(dedup(xs)) == dedup(xs)`).
pub fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut buckets: BTreeMap<(String, u32, String), Vec<Finding>> = BTreeMap::new();
    for finding in findings {
        buckets.entry(bucket_key(&finding)).or_default().push(finding);
    }

    buckets.into_values().map(merge_bucket).collect()
}

fn merge_bucket(bucket: Vec<Finding>) -> Finding {
    let mut representative = bucket[0].clone();
    let mut providers = representative.providers.clone();
    if let Some(p) = &representative.provider {
        providers.insert(p.clone());
    }

    let mut best_suggestion: Option<String> = sanitize_suggestion(representative.suggestion.as_deref());

    for candidate in &bucket[1..] {
        providers.extend(candidate.providers.iter().cloned());
        if let Some(p) = &candidate.provider {
            providers.insert(p.clone());
        }
        if candidate.severity > representative.severity {
            representative = candidate.clone();
        }
        if let Some(sanitized) = sanitize_suggestion(candidate.suggestion.as_deref()) {
            best_suggestion = match best_suggestion {
                Some(current) if current.len() >= sanitized.len() => Some(current),
                _ => Some(sanitized),
            };
        }
    }

    representative.providers = providers;
    representative.suggestion = best_suggestion;
    representative
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use std::collections::BTreeSet;

    fn finding(file: &str, line: u32, title: &str, severity: Severity, provider: &str) -> Finding {
        Finding {
            file: file.to_string(),
            line,
            severity,
            title: title.to_string(),
            message: title.to_string(),
            suggestion: None,
            category: None,
            provider: Some(provider.to_string()),
            providers: BTreeSet::from([provider.to_string()]),
            confidence: None,
            evidence: None,
            evidence_detail: None,
        }
    }

    #[test]
    fn merges_same_bucket_keeping_highest_severity_and_union_of_providers() {
        let a = finding("a.rs", 10, "unsafe call", Severity::Minor, "openai");
        let b = finding("a.rs", 10, "Unsafe Call", Severity::Critical, "ollama");
        let merged = dedup(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].severity, Severity::Critical);
        assert_eq!(merged[0].providers.len(), 2);
    }

    #[test]
    fn dedup_is_idempotent() {
        let a = finding("a.rs", 10, "x", Severity::Minor, "p1");
        let b = finding("b.rs", 20, "y", Severity::Major, "p2");
        let once = dedup(vec![a, b]);
        let twice = dedup(once.clone());
        assert_eq!(once.len(), twice.len());
    }
}
