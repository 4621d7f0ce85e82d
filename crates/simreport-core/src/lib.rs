//! # simreport Core Library
//!
//! Turns the record of a molecular simulation experiment (its metadata and analysis
//! files) into a paginated PDF report.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`ExperimentRecord`,
//!   `ReportDocument`), the metadata catalog, the plot renderer seam, and file I/O
//!   (experiment manifests in, PDF out).
//!
//! - **[`engine`]: The Logic Core.** The report builder state machine, value formatting,
//!   method-specific section selection, plot generation with per-file failure isolation,
//!   image grid layout, and temp-area ownership.
//!
//! - **[`workflows`]: The Public API.** One call that runs a complete build from an
//!   experiment record to a finalized PDF file.

pub mod core;
pub mod engine;
pub mod workflows;
