//! Data models shared by every layer of the library.
//!
//! - [`metadata`]: the attribute-value set attached to experiments and files.
//! - [`format`]: format tags used to group analysis files.
//! - [`experiment`]: the experiment record consumed by a report build.
//! - [`document`]: the in-memory report produced by a build.

pub mod document;
pub mod experiment;
pub mod format;
pub mod metadata;
