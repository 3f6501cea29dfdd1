//! SARIF 2.1.0 document (§6): one run, `tool.driver.name =
//! "multi-provider-code-review"`, rules and results one-to-one with
//! findings.

use serde::Serialize;
use serde_json::{json, Value};

use crate::model::{Finding, Review, Severity};

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "error",
        Severity::Major => "warning",
        Severity::Minor => "note",
    }
}

fn rule_id(finding: &Finding) -> String {
    finding
        .category
        .clone()
        .unwrap_or_else(|| "finding".to_string())
}

fn result_for(finding: &Finding) -> Value {
    json!({
        "ruleId": rule_id(finding),
        "level": sarif_level(finding.severity),
        "message": { "text": finding.message },
        "locations": [{
            "physicalLocation": {
                "artifactLocation": { "uri": finding.file },
                "region": { "startLine": finding.line }
            }
        }]
    })
}

fn rule_for(finding: &Finding) -> Value {
    json!({
        "id": rule_id(finding),
        "name": finding.title,
    })
}

#[derive(Serialize)]
struct Sarif {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<Value>,
}

pub fn render(review: &Review) -> Value {
    let mut rule_ids = std::collections::BTreeSet::new();
    let mut rules = Vec::new();
    for finding in &review.findings {
        if rule_ids.insert(rule_id(finding)) {
            rules.push(rule_for(finding));
        }
    }
    let results: Vec<Value> = review.findings.iter().map(result_for).collect();

    let run = json!({
        "tool": {
            "driver": {
                "name": "multi-provider-code-review",
                "rules": rules,
            }
        },
        "results": results,
    });

    serde_json::to_value(Sarif {
        schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        version: "2.1.0",
        runs: vec![run],
    })
    .expect("sarif document always serializes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewMetrics;
    use std::collections::BTreeSet;

    #[test]
    fn maps_severity_to_sarif_level() {
        let review = Review {
            findings: vec![Finding {
                file: "a.rs".into(),
                line: 5,
                severity: Severity::Critical,
                title: "t".into(),
                message: "m".into(),
                suggestion: None,
                category: None,
                provider: None,
                providers: BTreeSet::new(),
                confidence: None,
                evidence: None,
                evidence_detail: None,
            }],
            metrics: ReviewMetrics::default(),
            run_details: vec![],
            summary: None,
        };
        let doc = render(&review);
        assert_eq!(doc["version"], "2.1.0");
        assert_eq!(doc["runs"][0]["tool"]["driver"]["name"], "multi-provider-code-review");
        assert_eq!(doc["runs"][0]["results"][0]["level"], "error");
        assert_eq!(doc["runs"][0]["results"][0]["locations"][0]["physicalLocation"]["region"]["startLine"], 5);
    }
}
