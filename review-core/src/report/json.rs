//! Pretty-printed JSON report: a 2-space-indent serialization of
//! `Review`.

use crate::errors::MrResult;
use crate::model::Review;

pub fn render(review: &Review) -> MrResult<String> {
    Ok(serde_json::to_string_pretty(review)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewMetrics;

    #[test]
    fn renders_pretty_printed_json() {
        let review = Review {
            findings: vec![],
            metrics: ReviewMetrics::default(),
            run_details: vec![],
            summary: None,
        };
        let json = render(&review).unwrap();
        assert!(json.contains("  \"findings\""));
    }
}
