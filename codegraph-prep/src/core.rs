//! Filesystem scanning, parsing, ID assignment, normalization, chunking,
//! and run summary types shared by the pipeline.

pub mod chunking;
pub mod debug_ast;
pub mod fs_scan;
pub mod ids;
pub mod normalize;
pub mod parse;
pub mod summary;
pub mod traits;
