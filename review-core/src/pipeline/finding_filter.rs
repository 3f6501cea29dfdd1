//! Finding-filter (§4.5): title/message pattern rules applied after
//! quiet-mode, immediately before findings are handed to renderers.

use std::collections::BTreeMap;

use regex::Regex;

use crate::model::{Finding, PrContext, Severity};

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FilterStats {
    pub kept: usize,
    pub filtered: usize,
    pub downgraded: usize,
    pub reasons: BTreeMap<String, usize>,
}

impl FilterStats {
    fn bump_reason(&mut self, reason: &str) {
        *self.reasons.entry(reason.to_string()).or_insert(0) += 1;
    }
}

fn is_markdown_like(path: &str) -> bool {
    path.ends_with(".md") || path.ends_with(".mdx") || path.ends_with(".rst") || path.ends_with(".txt")
}

fn is_test_path(path: &str) -> bool {
    path.contains("__tests__")
        || path.contains(".test.")
        || path.contains(".spec.")
}

fn looks_like_doc_formatting_finding(finding: &Finding) -> bool {
    let text = format!("{} {}", finding.title, finding.message).to_lowercase();
    text.contains("formatting") || text.contains("markdown") || text.contains("typo")
}

fn looks_like_intentional_test_pattern(finding: &Finding) -> bool {
    let text = format!("{} {}", finding.title, finding.message).to_lowercase();
    text.contains("test pattern") || text.contains("intentional")
}

fn is_lint_style_suggestion(finding: &Finding) -> bool {
    let category = finding.category.as_deref().unwrap_or("");
    matches!(category, "lint" | "style" | "suggestion")
}

fn line_is_blank_or_closing_brace(file_patch: Option<&str>, line: u32) -> bool {
    let Some(patch) = file_patch else { return false };
    for added in crate::diff::map_added_lines(patch) {
        if added.new_line_number == line {
            let trimmed = added.content.trim();
            return trimmed.is_empty() || trimmed == "}" || trimmed == "});" || trimmed == "};";
        }
    }
    false
}

fn identifier_exists_in_diff(diff: &str, message: &str) -> bool {
    let identifier_re = Regex::new(r"`([A-Za-z_][A-Za-z0-9_]*)`").unwrap();
    identifier_re
        .captures_iter(message)
        .any(|cap| diff.contains(&cap[1]))
}

/// Applies every rule in order, returning the surviving findings plus
/// stats. This is the literal behavior specified: the "line number
/// invalid" rule matches against the unified diff body, not any
/// post-apply file state.
pub fn filter_with_context(findings: Vec<Finding>, pr: &PrContext) -> (Vec<Finding>, FilterStats) {
    let mut stats = FilterStats::default();
    let mut kept = Vec::new();

    for mut finding in findings {
        if is_markdown_like(&finding.file) && looks_like_doc_formatting_finding(&finding) {
            stats.filtered += 1;
            stats.bump_reason("documentation formatting on markdown path");
            continue;
        }
        if is_test_path(&finding.file) && looks_like_intentional_test_pattern(&finding) {
            stats.filtered += 1;
            stats.bump_reason("intentional test pattern");
            continue;
        }

        let file_patch = pr.files.iter().find(|f| f.filename == finding.file).and_then(|f| f.patch.as_deref());

        if finding.title.to_lowercase().contains("line number invalid")
            && line_is_blank_or_closing_brace(file_patch, finding.line)
        {
            stats.filtered += 1;
            stats.bump_reason("line number invalid on blank/closing-brace line");
            continue;
        }

        if finding.title.to_lowercase().contains("missing method") && identifier_exists_in_diff(&pr.diff, &finding.message) {
            stats.filtered += 1;
            stats.bump_reason("missing method identifier present in diff");
            continue;
        }

        if is_lint_style_suggestion(&finding) && finding.severity > Severity::Minor {
            finding.severity = Severity::Minor;
            stats.downgraded += 1;
            stats.bump_reason("lint/style/suggestion downgraded to minor");
        }

        kept.push(finding);
    }

    stats.kept = kept.len();
    (kept, stats)
}

/// Context-free variant used when no `PrContext` is available (tests,
/// simple callers) — every context-dependent rule becomes a no-op.
pub fn filter(findings: Vec<Finding>) -> (Vec<Finding>, FilterStats) {
    let mut stats = FilterStats::default();
    let mut kept = Vec::new();
    for mut finding in findings {
        if is_markdown_like(&finding.file) && looks_like_doc_formatting_finding(&finding) {
            stats.filtered += 1;
            stats.bump_reason("documentation formatting on markdown path");
            continue;
        }
        if is_test_path(&finding.file) && looks_like_intentional_test_pattern(&finding) {
            stats.filtered += 1;
            stats.bump_reason("intentional test pattern");
            continue;
        }
        if is_lint_style_suggestion(&finding) && finding.severity > Severity::Minor {
            finding.severity = Severity::Minor;
            stats.downgraded += 1;
            stats.bump_reason("lint/style/suggestion downgraded to minor");
        }
        kept.push(finding);
    }
    stats.kept = kept.len();
    (kept, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn finding(file: &str, title: &str, category: Option<&str>, severity: Severity) -> Finding {
        Finding {
            file: file.into(),
            line: 1,
            severity,
            title: title.into(),
            message: title.into(),
            suggestion: None,
            category: category.map(|c| c.to_string()),
            provider: None,
            providers: BTreeSet::new(),
            confidence: None,
            evidence: None,
            evidence_detail: None,
        }
    }

    #[test]
    fn filters_doc_formatting_on_markdown_path() {
        let (kept, stats) = filter(vec![finding("README.md", "formatting nit", None, Severity::Minor)]);
        assert!(kept.is_empty());
        assert_eq!(stats.filtered, 1);
    }

    #[test]
    fn downgrades_lint_findings_above_minor() {
        let (kept, stats) = filter(vec![finding("a.rs", "x", Some("lint"), Severity::Critical)]);
        assert_eq!(kept[0].severity, Severity::Minor);
        assert_eq!(stats.downgraded, 1);
    }
}
