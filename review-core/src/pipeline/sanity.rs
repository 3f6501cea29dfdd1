//! Suggestion sanity (§4.10): trim a candidate suggestion and reject it
//! outright if it's empty, too long, or looks like prose rather than a
//! code change.

const MAX_SUGGESTION_LINES: usize = 50;
const STRUCTURAL_CHARS: [char; 8] = ['{', '}', '(', ')', '[', ']', ';', '='];

/// Returns `Some(trimmed)` when `suggestion` passes the sanity check,
/// `None` otherwise. Anything returned is stored as-is.
pub fn sanitize_suggestion(suggestion: Option<&str>) -> Option<String> {
    let trimmed = suggestion?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.lines().count() > MAX_SUGGESTION_LINES {
        return None;
    }
    if !trimmed.chars().any(|c| STRUCTURAL_CHARS.contains(&c) || c == '<' || c == '>' || c == ':') {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_prose_only_suggestions() {
        assert_eq!(sanitize_suggestion(Some("   ")), None);
        assert_eq!(sanitize_suggestion(Some("this looks fine to me")), None);
    }

    #[test]
    fn rejects_overly_long_suggestions() {
        let long = "x = 1;\n".repeat(60);
        assert_eq!(sanitize_suggestion(Some(&long)), None);
    }

    #[test]
    fn keeps_code_like_suggestions_trimmed() {
        assert_eq!(
            sanitize_suggestion(Some("  let x = foo();  ")),
            Some("let x = foo();".to_string())
        );
    }
}
