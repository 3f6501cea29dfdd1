//! Artifact export: JSONL records, GraphML, Qdrant RAG payload, and the
//! combined `save_all` writer.

pub mod graphml;
pub mod jsonl;
pub mod qdrant_prep;
pub mod save_all;
