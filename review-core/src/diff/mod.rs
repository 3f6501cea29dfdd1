//! Diff utilities (§4.1): map a patch's added lines to line numbers,
//! filter a unified diff by file set, and map a source line back onto a
//! position within a patch for inline comment posting.
//!
//! Grounded on the unified-diff hunk-header parsing previously done in
//! `parser::parse_unified_diff_advanced`, simplified to the exact
//! operations the spec names.

/// One added line and the (1-based) line number it occupies in the new
/// file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedLine {
    pub new_line_number: u32,
    pub content: String,
}

/// Returns every `+` line in `patch` (skipping `+++` file headers) with
/// the new-file line number it corresponds to.
///
/// A hunk header `@@ -a,b +c,d @@` resets the cursor to `c`; context
/// lines (` `) advance the cursor by one; `-` lines do not advance it.
pub fn map_added_lines(patch: &str) -> Vec<AddedLine> {
    let mut out = Vec::new();
    let mut cursor: u32 = 0;
    let mut in_hunk = false;

    for line in patch.lines() {
        if line.starts_with("@@") {
            if let Some(start) = parse_hunk_new_start(line) {
                cursor = start;
                in_hunk = true;
            }
            continue;
        }
        if !in_hunk {
            continue;
        }
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }
        if let Some(rest) = line.strip_prefix('+') {
            out.push(AddedLine {
                new_line_number: cursor,
                content: rest.to_string(),
            });
            cursor += 1;
        } else if line.starts_with('-') {
            // removed line: does not occupy a position in the new file
        } else {
            // context line (leading space, or no marker at all)
            cursor += 1;
        }
    }

    out
}

fn parse_hunk_new_start(header: &str) -> Option<u32> {
    let (_, right) = header
        .trim_start_matches('@')
        .trim_end_matches('@')
        .trim()
        .split_once('+')?;
    let nums = right.trim().split_whitespace().next().unwrap_or(right.trim());
    let start = nums.split(',').next()?;
    start.parse().ok()
}

/// Splits `diff` into its per-file `diff --git` blocks and returns only
/// those whose target path (the `+++ b/<path>` side, falling back to the
/// `diff --git a/x b/y` header's `y`) is in `files`, preserving order.
pub fn filter_diff_by_files(diff: &str, files: &[String]) -> String {
    let blocks = split_diff_blocks(diff);
    blocks
        .into_iter()
        .filter(|block| {
            target_path_of_block(block)
                .map(|path| files.iter().any(|f| f == &path))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>()
        .join("")
}

fn split_diff_blocks(diff: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in diff.split_inclusive('\n') {
        if line.starts_with("diff --git") && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn target_path_of_block(block: &str) -> Option<String> {
    for line in block.lines() {
        if let Some(rest) = line.strip_prefix("+++ ") {
            let rest = rest.trim();
            if rest == "/dev/null" {
                continue;
            }
            return Some(strip_ab_prefix(rest).to_string());
        }
    }
    // fall back to the `diff --git a/x b/y` header
    let header = block.lines().next()?;
    let rest = header.strip_prefix("diff --git ")?;
    let (_, b) = rest.rsplit_once(" b/")?;
    Some(b.trim().to_string())
}

fn strip_ab_prefix(path: &str) -> &str {
    path.strip_prefix("b/").or_else(|| path.strip_prefix("a/")).unwrap_or(path)
}

/// Maps a source (new-file) line number to a 1-based position within the
/// patch body, counting every non-hunk-header line from the top of the
/// patch. Returns `None` when `line` is only present on the left side
/// (i.e. it was deleted, not added/context in the new file).
pub fn validate_suggestion_line(line: u32, patch: &str) -> Option<u32> {
    let mut position: u32 = 0;
    let mut cursor: u32 = 0;
    let mut in_hunk = false;

    for raw in patch.lines() {
        if raw.starts_with("@@") {
            if let Some(start) = parse_hunk_new_start(raw) {
                cursor = start;
                in_hunk = true;
            }
            continue;
        }
        position += 1;
        if !in_hunk || raw.starts_with("+++") || raw.starts_with("---") {
            continue;
        }
        if raw.starts_with('+') || raw.starts_with(' ') || (!raw.starts_with('-')) {
            if cursor == line {
                return Some(position);
            }
            cursor += 1;
        }
        // '-' lines do not advance cursor and are not addressable.
    }
    None
}

/// Like [`validate_suggestion_line`] but for a closed range: requires
/// `start <= end`, a span of at most 50 lines, and every intermediate
/// line number present on the right side of the patch.
pub fn validate_suggestion_range(start: u32, end: u32, patch: &str) -> bool {
    if start > end || end - start + 1 > 50 {
        return false;
    }
    (start..=end).all(|l| validate_suggestion_line(l, patch).is_some())
}

/// Heuristic detector for binary patches / "files differ" messages.
pub fn looks_like_binary_patch(s: &str) -> bool {
    s.contains("GIT binary patch")
        || s.starts_with("Binary files ")
        || (s.starts_with("Files ") && s.contains(" differ"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATCH: &str = "@@ -10,3 +10,4 @@\n context one\n-removed line\n+added one\n+added two\n context two\n";

    #[test]
    fn map_added_lines_assigns_sequential_new_numbers() {
        let added = map_added_lines(PATCH);
        assert_eq!(
            added,
            vec![
                AddedLine { new_line_number: 11, content: "added one".into() },
                AddedLine { new_line_number: 12, content: "added two".into() },
            ]
        );
    }

    #[test]
    fn validate_suggestion_line_finds_added_line() {
        assert!(validate_suggestion_line(11, PATCH).is_some());
    }

    #[test]
    fn validate_suggestion_line_rejects_deleted_only_line() {
        // old line 11 ("removed line") never appears on the right side.
        let only_removed = "@@ -1,2 +1,1 @@\n context\n-gone\n";
        assert_eq!(validate_suggestion_line(2, only_removed), None);
    }

    #[test]
    fn validate_suggestion_range_rejects_backwards_or_oversized() {
        assert!(!validate_suggestion_range(5, 3, PATCH));
        assert!(!validate_suggestion_range(1, 100, PATCH));
    }

    #[test]
    fn filter_diff_by_files_keeps_only_requested_targets() {
        let diff = "diff --git a/x.rs b/x.rs\n--- a/x.rs\n+++ b/x.rs\n@@ -1,1 +1,1 @@\n-old\n+new\ndiff --git a/y.rs b/y.rs\n--- a/y.rs\n+++ b/y.rs\n@@ -1,1 +1,1 @@\n-old\n+new\n";
        let filtered = filter_diff_by_files(diff, &["y.rs".to_string()]);
        assert!(filtered.contains("b/y.rs"));
        assert!(!filtered.contains("b/x.rs"));
    }
}
