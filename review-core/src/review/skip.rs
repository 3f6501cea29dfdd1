//! Skip gating (§4.9 step 1): the first gate in the orchestrator.

use crate::config::ReviewConfig;
use crate::model::PrContext;

const DEFAULT_BOT_PATTERNS: [&str; 3] = ["[bot]", "dependabot", "renovate"];

fn author_is_bot(author: &str) -> bool {
    let lower = author.to_lowercase();
    DEFAULT_BOT_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Returns a skip reason when the PR should not be reviewed at all.
pub fn skip_reason(pr: &PrContext, config: &ReviewConfig) -> Option<String> {
    if pr.draft && config.skip_drafts {
        return Some("skipped: pull request is a draft".to_string());
    }
    if config.skip_bots && author_is_bot(&pr.author) {
        return Some(format!("skipped: author '{}' matches a bot pattern", pr.author));
    }
    if config.skip_labels.iter().any(|l| pr.labels.contains(l)) {
        return Some("skipped: labeled for skip".to_string());
    }
    if pr.total_changed_lines() < config.min_changed_lines {
        return Some(format!(
            "skipped: only {} changed lines (minimum {})",
            pr.total_changed_lines(),
            config.min_changed_lines
        ));
    }
    if pr.files.len() > config.max_changed_files {
        return Some(format!(
            "skipped: {} changed files exceeds the maximum of {}",
            pr.files.len(),
            config.max_changed_files
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileChange, FileStatus};
    use std::collections::BTreeSet;

    fn pr() -> PrContext {
        PrContext {
            number: 1,
            title: "t".into(),
            body: "b".into(),
            author: "alice".into(),
            draft: false,
            labels: BTreeSet::new(),
            files: vec![FileChange::new("a.rs", FileStatus::Modified, 10, 0, None, None)],
            diff: String::new(),
            base_sha: "base".into(),
            head_sha: "head".into(),
        }
    }

    #[test]
    fn skips_drafts_when_configured() {
        let mut p = pr();
        p.draft = true;
        let mut cfg = ReviewConfig::default();
        cfg.skip_drafts = true;
        assert!(skip_reason(&p, &cfg).is_some());
    }

    #[test]
    fn skips_bot_authors() {
        let mut p = pr();
        p.author = "dependabot[bot]".into();
        let mut cfg = ReviewConfig::default();
        cfg.skip_bots = true;
        assert!(skip_reason(&p, &cfg).is_some());
    }

    #[test]
    fn does_not_skip_ordinary_prs() {
        let cfg = ReviewConfig::default();
        assert!(skip_reason(&pr(), &cfg).is_none());
    }
}
