//! Trivial detection (§4.9 step 2): classifies files as trivial (lock
//! files, docs-only, formatting-only, test fixtures, config, build
//! artifacts) and filters them out of the reviewed file set.

use crate::config::ReviewConfig;
use crate::model::FileChange;

const DEFAULT_TRIVIAL_PATTERNS: [&str; 8] = [
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "*.md",
    "*.min.js",
    "*.snap",
    "dist/*",
    "build/*",
];

fn glob_like_match(pattern: &str, path: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix("/*") {
        return path.starts_with(prefix);
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return path.ends_with(suffix);
    }
    path == pattern || path.ends_with(&format!("/{pattern}"))
}

pub fn is_trivial(file: &FileChange, config: &ReviewConfig) -> bool {
    let patterns = if config.trivial_patterns.is_empty() {
        DEFAULT_TRIVIAL_PATTERNS.iter().map(|p| p.to_string()).collect()
    } else {
        config.trivial_patterns.clone()
    };
    patterns.iter().any(|p| glob_like_match(p, &file.filename))
}

/// Returns the non-trivial files, or `None` when every file is trivial
/// (the caller should short-circuit with a canned trivial review).
pub fn filter_non_trivial(files: &[FileChange], config: &ReviewConfig) -> Option<Vec<FileChange>> {
    if !config.skip_trivial_changes {
        return Some(files.to_vec());
    }
    let kept: Vec<FileChange> = files.iter().filter(|f| !is_trivial(f, config)).cloned().collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileStatus;

    #[test]
    fn lock_files_are_trivial_by_default() {
        let cfg = ReviewConfig::default();
        let file = FileChange::new("Cargo.lock", FileStatus::Modified, 5, 5, None, None);
        assert!(is_trivial(&file, &cfg));
    }

    #[test]
    fn source_files_are_not_trivial() {
        let cfg = ReviewConfig::default();
        let file = FileChange::new("src/lib.rs", FileStatus::Modified, 5, 5, None, None);
        assert!(!is_trivial(&file, &cfg));
    }

    #[test]
    fn all_trivial_files_yields_none() {
        let cfg = ReviewConfig::default();
        let files = vec![FileChange::new("Cargo.lock", FileStatus::Modified, 1, 1, None, None)];
        assert!(filter_non_trivial(&files, &cfg).is_none());
    }
}
