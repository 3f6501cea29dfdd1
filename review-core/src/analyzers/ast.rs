//! Lightweight AST-pattern analyzer: flags a handful of structural
//! smells directly in added lines, without a full parse.

use std::collections::BTreeSet;

use crate::diff::map_added_lines;
use crate::model::{Finding, FileChange, Severity};

pub fn scan(files: &[&FileChange]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for file in files {
        let Some(patch) = &file.patch else { continue };
        for added in map_added_lines(patch) {
            let trimmed = added.content.trim();
            if trimmed.contains(".unwrap()") && !file.filename.contains("test") {
                findings.push(local_finding(
                    file,
                    added.new_line_number,
                    Severity::Minor,
                    "unchecked unwrap",
                    "unwrap() call outside test code may panic on unexpected input",
                ));
            }
            if trimmed == "TODO" || trimmed.starts_with("// TODO") || trimmed.starts_with("# TODO") {
                findings.push(local_finding(
                    file,
                    added.new_line_number,
                    Severity::Minor,
                    "unresolved TODO",
                    "a TODO comment was added without a tracked follow-up",
                ));
            }
        }
    }
    findings
}

fn local_finding(file: &FileChange, line: u32, severity: Severity, title: &str, message: &str) -> Finding {
    Finding {
        file: file.filename.clone(),
        line,
        severity,
        title: title.to_string(),
        message: message.to_string(),
        suggestion: None,
        category: Some("ast".to_string()),
        provider: Some("ast".to_string()),
        providers: BTreeSet::from(["ast".to_string()]),
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
    fn flags_unwrap_outside_tests() {
        let patch = "@@ -1,0 +1,1 @@\n+let x = might_fail().unwrap();\n";
        let file = FileChange::new("src/lib.rs", FileStatus::Modified, 1, 0, Some(patch.to_string()), None);
        let findings = scan(&[&file]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "unchecked unwrap");
    }

    #[test]
    fn does_not_flag_unwrap_in_test_files() {
        let patch = "@@ -1,0 +1,1 @@\n+let x = might_fail().unwrap();\n";
        let file = FileChange::new("src/lib_test.rs".to_string() + "test", FileStatus::Modified, 1, 0, Some(patch.to_string()), None);
        let findings = scan(&[&file]);
        assert!(findings.is_empty());
    }
}
