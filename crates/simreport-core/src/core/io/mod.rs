//! File input and output: experiment manifests in, PDF reports out.

pub mod manifest;
pub mod pdf;
