//! Incremental-review store (§4.4): per-PR record of the last reviewed
//! commit plus prior findings, keyed `incremental-review-pr-<n>`.

use chrono::Utc;

use crate::model::{IncrementalRecord, PrContext};

use super::{read_json, write_json};

pub struct IncrementalStore;

impl IncrementalStore {
    pub async fn read(pr_number: u64) -> Option<IncrementalRecord> {
        read_json(&IncrementalRecord::cache_key(pr_number)).await
    }

    pub async fn write(record: &IncrementalRecord) -> crate::errors::MrResult<()> {
        write_json(&IncrementalRecord::cache_key(record.pr_number), record).await
    }

    /// True iff: a stored record exists, the PR's head moved past the
    /// last reviewed commit, and the record is not older than
    /// `cache_ttl_days`. Feature-enablement is checked by the caller.
    pub fn should_use_incremental(
        pr: &PrContext,
        record: Option<&IncrementalRecord>,
        cache_ttl_days: i64,
    ) -> bool {
        let Some(record) = record else {
            return false;
        };
        if pr.head_sha == record.last_reviewed_commit {
            return false;
        }
        let age_ms = Utc::now().timestamp_millis() - record.timestamp;
        let ttl_ms = cache_ttl_days * 24 * 60 * 60 * 1000;
        age_ms <= ttl_ms
    }
}

/// Lists files changed between `from_sha` (the last reviewed commit) and
/// the PR's head, via an external VCS collaborator. A successful but
/// empty response is honored as-is (nothing changed); only an actual VCS
/// failure fails open and returns every file in the PR.
pub async fn get_changed_files_since<F, Fut>(
    pr: &PrContext,
    from_sha: &str,
    list_changed_files: F,
) -> Vec<String>
where
    F: FnOnce(String, String) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<String>, crate::errors::Error>>,
{
    match list_changed_files(from_sha.to_string(), pr.head_sha.clone()).await {
        Ok(files) => files,
        Err(_) => pr.files.iter().map(|f| f.filename.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileStatus;
    use std::collections::BTreeSet;

    fn sample_pr(head_sha: &str) -> PrContext {
        PrContext {
            number: 1,
            title: "t".into(),
            body: "b".into(),
            author: "me".into(),
            draft: false,
            labels: BTreeSet::new(),
            files: vec![crate::model::FileChange::new(
                "a.rs",
                FileStatus::Modified,
                1,
                0,
                None,
                None,
            )],
            diff: String::new(),
            base_sha: "base".into(),
            head_sha: head_sha.into(),
        }
    }

    #[test]
    fn should_use_incremental_requires_head_to_have_moved() {
        let pr = sample_pr("abc123");
        let record = IncrementalRecord {
            pr_number: 1,
            last_reviewed_commit: "abc123".into(),
            timestamp: Utc::now().timestamp_millis(),
            findings: vec![],
            review_summary: String::new(),
        };
        assert!(!IncrementalStore::should_use_incremental(&pr, Some(&record), 7));
    }

    #[test]
    fn should_use_incremental_false_when_expired() {
        let pr = sample_pr("def456");
        let eight_days_ago = Utc::now().timestamp_millis() - 8 * 24 * 60 * 60 * 1000;
        let record = IncrementalRecord {
            pr_number: 1,
            last_reviewed_commit: "abc123".into(),
            timestamp: eight_days_ago,
            findings: vec![],
            review_summary: String::new(),
        };
        assert!(!IncrementalStore::should_use_incremental(&pr, Some(&record), 7));
    }

    #[test]
    fn should_use_incremental_true_when_fresh_and_moved() {
        let pr = sample_pr("def456");
        let record = IncrementalRecord {
            pr_number: 1,
            last_reviewed_commit: "abc123".into(),
            timestamp: Utc::now().timestamp_millis(),
            findings: vec![],
            review_summary: String::new(),
        };
        assert!(IncrementalStore::should_use_incremental(&pr, Some(&record), 7));
    }

    #[tokio::test]
    async fn get_changed_files_since_fails_open_on_vcs_error() {
        let pr = sample_pr("def456");
        let files = get_changed_files_since(&pr, "abc123", |_, _| async {
            Err(crate::errors::Error::Other("not a git repository".into()))
        })
        .await;
        assert_eq!(files, vec!["a.rs".to_string()]);
    }

    #[tokio::test]
    async fn get_changed_files_since_honors_a_genuinely_empty_vcs_response() {
        let pr = sample_pr("def456");
        let files = get_changed_files_since(&pr, "abc123", |_, _| async { Ok(Vec::new()) }).await;
        assert!(files.is_empty());
    }
}
