//! # Workflows Module
//!
//! Top-level entry points of the library. A workflow wires the [`crate::core`]
//! collaborators and the [`crate::engine`] together for one complete task.
//!
//! - **Report Workflow** ([`report`]) - builds the PDF report of an experiment record,
//!   from title to finalized file.

pub mod report;
