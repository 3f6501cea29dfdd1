//! Token estimator and batch planner (§4.2).

use std::collections::BTreeMap;

use crate::errors::Error;
use crate::model::FileChange;

/// Estimates tokens for one changed file: `len(patch) / 4.4` when a patch
/// is present (a diff is denser than plain code), else
/// `(additions + deletions) * 20`.
pub fn estimate_tokens(file: &FileChange) -> u64 {
    match &file.patch {
        Some(patch) => ((patch.len() as f64) / 4.4).round() as u64,
        None => ((file.additions + file.deletions) as u64) * 20,
    }
}

pub fn estimate_total_tokens(files: &[FileChange]) -> u64 {
    files.iter().map(estimate_tokens).sum()
}

#[derive(Debug, Clone)]
pub struct Batch {
    pub files: Vec<FileChange>,
    pub estimated_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub batches: Vec<Batch>,
    pub avg_tokens_per_batch: f64,
    pub reason: String,
}

/// Greedily packs `files` (sorted by estimated tokens descending) into
/// batches whose running total stays at or under `target_tokens * 1.2`
/// and whose file count stays at or under `max_files_per_batch`. A file
/// whose own estimate already exceeds the target becomes its own batch.
pub fn plan_batches(
    files: &[FileChange],
    target_tokens: u64,
    max_files_per_batch: usize,
) -> BatchPlan {
    let cap = (target_tokens as f64 * 1.2) as u64;

    let mut sized: Vec<(FileChange, u64)> = files
        .iter()
        .cloned()
        .map(|f| {
            let t = estimate_tokens(&f);
            (f, t)
        })
        .collect();
    sized.sort_by(|a, b| b.1.cmp(&a.1));

    let mut batches: Vec<Batch> = Vec::new();
    let mut current_files: Vec<FileChange> = Vec::new();
    let mut current_tokens: u64 = 0;
    let mut capped_by_max_files = false;
    let mut large_files = 0usize;
    let mut small_files = 0usize;

    for (file, tokens) in sized {
        if tokens > cap && current_files.is_empty() {
            large_files += 1;
            batches.push(Batch {
                files: vec![file],
                estimated_tokens: tokens,
            });
            continue;
        }
        let would_exceed_tokens = current_tokens + tokens > cap && !current_files.is_empty();
        let would_exceed_files = current_files.len() >= max_files_per_batch;
        if would_exceed_tokens || would_exceed_files {
            if would_exceed_files {
                capped_by_max_files = true;
            }
            batches.push(Batch {
                files: std::mem::take(&mut current_files),
                estimated_tokens: current_tokens,
            });
            current_tokens = 0;
        }
        if tokens < target_tokens / 10.max(1) {
            small_files += 1;
        }
        current_tokens += tokens;
        current_files.push(file);
    }
    if !current_files.is_empty() {
        batches.push(Batch {
            files: current_files,
            estimated_tokens: current_tokens,
        });
    }

    let avg = if batches.is_empty() {
        0.0
    } else {
        batches.iter().map(|b| b.estimated_tokens).sum::<u64>() as f64 / batches.len() as f64
    };

    let reason = if batches.len() <= 1 {
        "single batch"
    } else if large_files > 0 {
        "large files dominant"
    } else if capped_by_max_files {
        "capped by maxFiles"
    } else if small_files * 2 > files.len() {
        "many small files"
    } else {
        "single batch"
    };

    BatchPlan {
        batches,
        avg_tokens_per_batch: avg,
        reason: reason.to_string(),
    }
}

/// Resolves the batch size for a set of providers: the minimum of
/// `default_batch_size`, `max_batch_size`, and any per-provider override
/// matching by exact name or prefix (`"openrouter"` matches
/// `"openrouter/model-x"`).
pub struct BatchOrchestrator;

impl BatchOrchestrator {
    pub fn get_batch_size(
        provider_names: &[String],
        default_batch_size: i64,
        max_batch_size: i64,
        provider_overrides: &BTreeMap<String, usize>,
    ) -> Result<usize, Error> {
        if default_batch_size <= 0 || max_batch_size <= 0 {
            return Err(Error::InvalidBatchSize(default_batch_size.min(max_batch_size)));
        }
        let mut size = default_batch_size.min(max_batch_size) as usize;
        for name in provider_names {
            for (key, override_size) in provider_overrides {
                if name == key || name.starts_with(key.as_str()) {
                    size = size.min(*override_size);
                }
            }
        }
        if size == 0 {
            return Err(Error::InvalidBatchSize(0));
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileStatus;

    fn file(name: &str, additions: u32, deletions: u32) -> FileChange {
        FileChange::new(name, FileStatus::Modified, additions, deletions, None, None)
    }

    #[test]
    fn estimate_tokens_uses_patch_length_when_present() {
        let mut f = file("a.rs", 1, 1);
        f.patch = Some("x".repeat(44));
        assert_eq!(estimate_tokens(&f), 10);
    }

    #[test]
    fn estimate_tokens_falls_back_to_line_count() {
        let f = file("a.rs", 2, 3);
        assert_eq!(estimate_tokens(&f), 100);
    }

    #[test]
    fn plan_batches_respects_file_and_token_caps() {
        let files: Vec<FileChange> = (0..20).map(|i| file(&format!("f{i}.rs"), 50, 50)).collect();
        let plan = plan_batches(&files, 1000, 5);
        let total: usize = plan.batches.iter().map(|b| b.files.len()).sum();
        assert_eq!(total, files.len());
        for batch in &plan.batches {
            assert!(batch.files.len() <= 5);
            assert!(batch.estimated_tokens <= (1000.0 * 1.2) as u64 || batch.files.len() == 1);
        }
    }

    #[test]
    fn plan_batches_gives_oversized_file_its_own_batch() {
        let mut huge = file("huge.rs", 0, 0);
        huge.patch = Some("x".repeat(100_000));
        let files = vec![huge, file("small.rs", 1, 1)];
        let plan = plan_batches(&files, 100, 10);
        assert!(plan.batches.iter().any(|b| b.files.len() == 1 && b.files[0].filename == "huge.rs"));
    }

    #[test]
    fn get_batch_size_takes_minimum_with_prefix_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert("openrouter".to_string(), 3);
        let size = BatchOrchestrator::get_batch_size(
            &["openrouter/model-x".to_string()],
            10,
            20,
            &overrides,
        )
        .unwrap();
        assert_eq!(size, 3);
    }

    #[test]
    fn get_batch_size_rejects_non_positive_defaults() {
        let overrides = BTreeMap::new();
        let err = BatchOrchestrator::get_batch_size(&[], 0, 20, &overrides).unwrap_err();
        assert!(matches!(err, Error::InvalidBatchSize(_)));
    }
}
