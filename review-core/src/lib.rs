//! Public entry for the multi-provider code review engine.
//!
//! A single high-level function, [`review::run_review`], runs the whole
//! pipeline for one pull/merge request: skip gating, trivial-file
//! filtering, intensity classification, code-graph build, incremental
//! narrowing, concurrent LLM dispatch, static analysis, and the finding
//! pipeline (dedup → consensus → evidence → quiet-mode → filtering).
//!
//! The crate uses `tracing` for structured logging and avoids
//! `async-trait` and heap trait objects (no `Box<dyn ...>`) in favor of
//! plain `async fn` and enum-dispatch over the provider adapters.

pub mod analyzers;
pub mod batch;
pub mod cache;
pub mod config;
pub mod diff;
pub mod errors;
pub mod graph;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod reliability;
pub mod report;
pub mod review;

pub use config::{Intensity, ReviewConfig};
pub use errors::{Error, MrResult};
pub use model::{Finding, PrContext, Review, Severity};
pub use providers::Provider;
pub use reliability::ReliabilityTracker;
pub use review::{run_review, ReviewOutcome};
