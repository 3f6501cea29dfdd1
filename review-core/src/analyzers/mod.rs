//! Static analyzers (§4.9 step 7): AST pattern findings, secret
//! scanner, and a small rules engine, all operating over added lines so
//! they never need the full pre-change file content.

pub mod ast;
pub mod rules;
pub mod secrets;

use crate::config::ReviewConfig;
use crate::model::{Finding, PrContext};

/// Runs every enabled local analyzer over `files_to_review` and
/// concatenates their findings, each tagged with its originating
/// analyzer name (`ast`, `security`, `rules`).
pub fn run_static_analyzers(pr: &PrContext, files_to_review: &[String], config: &ReviewConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    let changed: Vec<_> = pr
        .files
        .iter()
        .filter(|f| files_to_review.contains(&f.filename))
        .collect();

    if config.enable_ast_analysis {
        findings.extend(ast::scan(&changed));
    }
    if config.enable_security {
        findings.extend(secrets::scan(&changed));
    }
    findings.extend(rules::scan(&changed));
    findings
}
