//! Thin CLI front end for `review_core`. Loads a PR context (and,
//! optionally, a config override) from JSON files, runs one review, and
//! prints the result as JSON or SARIF. Diff/comment loading and posting
//! back to a forge are external collaborators (§6) this binary does not
//! implement — it only demonstrates the orchestrator end to end.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use review_core::model::{FileChange, FileStatus};
use review_core::providers::{MockProviderConfig, OllamaProviderConfig, OpenAiProviderConfig, Provider};
use review_core::{Error, PrContext, ReliabilityTracker, ReviewConfig, ReviewOutcome};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ReportFormat {
    Json,
    Sarif,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProviderKind {
    Mock,
    Ollama,
    OpenAi,
}

/// Runs the multi-provider review engine against a single pull/merge
/// request described as JSON.
#[derive(Parser, Debug)]
#[command(name = "mpr-engine", version, about)]
struct Cli {
    /// JSON-serialized `PrContext`. Without it, a small built-in demo PR
    /// is reviewed instead.
    #[arg(long)]
    pr_file: Option<PathBuf>,

    /// JSON-serialized `ReviewConfig` override. Without it, defaults apply.
    #[arg(long)]
    config_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,

    /// Which provider adapter to exercise.
    #[arg(long, value_enum, default_value_t = ProviderKind::Mock)]
    provider: ProviderKind,

    /// Endpoint for the Ollama/OpenAI provider.
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name for the Ollama/OpenAI provider.
    #[arg(long, default_value = "gpt-4")]
    model: String,

    /// API key for the OpenAI provider (falls back to `OPENAI_API_KEY`).
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "review run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Error> {
    let pr = match &cli.pr_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<PrContext>(&raw)?
        }
        None => demo_pr_context(),
    };

    let config = match &cli.config_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<ReviewConfig>(&raw)?
        }
        None => ReviewConfig::default(),
    };

    let provider = build_provider(&cli);
    let reliability = ReliabilityTracker::new(Duration::from_secs(30));

    info!(pr = pr.number, provider = provider.name(), "starting review");

    let outcome = review_core::run_review(pr, config, vec![provider], &reliability, no_vcs_history).await?;

    match outcome {
        ReviewOutcome::Completed(review) => {
            let code = review.exit_code();
            let rendered = match cli.format {
                ReportFormat::Json => review_core::report::json::render(&review)?,
                ReportFormat::Sarif => {
                    serde_json::to_string_pretty(&review_core::report::sarif::render(&review))?
                }
            };
            println!("{rendered}");
            Ok(ExitCode::from(code as u8))
        }
        ReviewOutcome::Skipped(reason) => {
            info!(reason = %reason, "review skipped");
            println!("{{\"skipped\": {reason:?}}}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_provider(cli: &Cli) -> Provider {
    match cli.provider {
        ProviderKind::Mock => Provider::Mock(MockProviderConfig {
            name: "mock".to_string(),
            canned_response: "no issues found".to_string(),
            healthy: true,
        }),
        ProviderKind::Ollama => Provider::Ollama(OllamaProviderConfig {
            name: "ollama".to_string(),
            endpoint: cli
                .endpoint
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            model: cli.model.clone(),
        }),
        ProviderKind::OpenAi => Provider::OpenAi(OpenAiProviderConfig {
            name: "openai".to_string(),
            endpoint: cli
                .endpoint
                .clone()
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            model: cli.model.clone(),
            api_key: cli
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .unwrap_or_default(),
        }),
    }
}

/// No-op VCS collaborator: incremental narrowing is disabled by default,
/// so this is only invoked when `--config-file` turns it on.
async fn no_vcs_history(_from: String, _to: String) -> Result<Vec<String>, Error> {
    Ok(Vec::new())
}

/// A tiny one-file PR used when no `--pr-file` is given, so the binary
/// can be exercised with no setup beyond `cargo run`.
fn demo_pr_context() -> PrContext {
    let file = FileChange::new(
        "src/lib.rs",
        FileStatus::Modified,
        12,
        3,
        Some(
            "@@ -1,3 +1,12 @@\n+pub fn add(a: i32, b: i32) -> i32 {\n+    a + b\n+}\n".to_string(),
        ),
        None,
    );

    PrContext {
        number: 1,
        title: "demo: add helper function".to_string(),
        body: "Demonstrates the review engine against a single small diff.".to_string(),
        author: "demo-user".to_string(),
        draft: false,
        labels: BTreeSet::new(),
        files: vec![file],
        diff: "diff --git a/src/lib.rs b/src/lib.rs\n@@ -1,3 +1,12 @@\n+pub fn add(a: i32, b: i32) -> i32 {\n+    a + b\n+}\n".to_string(),
        base_sha: "0000000000000000000000000000000000000000".to_string(),
        head_sha: "1111111111111111111111111111111111111111".to_string(),
    }
}
