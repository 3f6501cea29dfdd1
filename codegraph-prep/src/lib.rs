//! AST/graph preparation library: Tree-sitter-based parsing, language-aware
//! relation extraction, AST-aware chunking, and export to JSONL/GraphML/RAG
//! payload formats.
//!
//! `review-core`'s diff-driven code graph reuses [`model::ast::AstKind`] and
//! [`model::language::LanguageKind`] from this crate so both the full-repo
//! pipeline and the lightweight per-PR builder share one symbol taxonomy.

pub mod config;
pub mod core;
pub mod export;
pub mod graph;
pub mod languages;
pub mod model;
pub mod run;

pub use run::prepare_qdrant_context;
