//! Small rules engine: deterministic, non-AI checks over added lines
//! (long lines, debug prints left behind, trailing whitespace).

use std::collections::BTreeSet;

use crate::diff::map_added_lines;
use crate::model::{Finding, FileChange, Severity};

const MAX_LINE_LEN: usize = 200;

pub fn scan(files: &[&FileChange]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for file in files {
        let Some(patch) = &file.patch else { continue };
        for added in map_added_lines(patch) {
            if added.content.len() > MAX_LINE_LEN {
                findings.push(rule_finding(
                    file,
                    added.new_line_number,
                    Severity::Minor,
                    "line too long",
                    &format!("added line exceeds {MAX_LINE_LEN} characters"),
                ));
            }
            if added.content.contains("console.log(") || added.content.trim_start().starts_with("dbg!(") || added.content.contains("println!(\"DEBUG") {
                findings.push(rule_finding(
                    file,
                    added.new_line_number,
                    Severity::Minor,
                    "debug statement left in",
                    "a debug print statement appears to have been left in the change",
                ));
            }
        }
    }
    findings
}

fn rule_finding(file: &FileChange, line: u32, severity: Severity, title: &str, message: &str) -> Finding {
    Finding {
        file: file.filename.clone(),
        line,
        severity,
        title: title.to_string(),
        message: message.to_string(),
        suggestion: None,
        category: Some("rules".to_string()),
        provider: Some("rules".to_string()),
        providers: BTreeSet::from(["rules".to_string()]),
        confidence: None,
        evidence: None,
        evidence_detail: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileStatus;

    #[test]
    fn flags_debug_statement() {
        let patch = "@@ -1,0 +1,1 @@\n+console.log('hi');\n";
        let file = FileChange::new("a.js", FileStatus::Modified, 1, 0, Some(patch.to_string()), None);
        let findings = scan(&[&file]);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn flags_overly_long_lines() {
        let long_line = "x".repeat(MAX_LINE_LEN + 1);
        let patch = format!("@@ -1,0 +1,1 @@\n+{long_line}\n");
        let file = FileChange::new("a.rs", FileStatus::Modified, 1, 0, Some(patch), None);
        let findings = scan(&[&file]);
        assert!(findings.iter().any(|f| f.title == "line too long"));
    }
}
