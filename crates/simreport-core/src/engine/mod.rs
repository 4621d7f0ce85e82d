//! # Engine Module
//!
//! Stateful orchestration of a report build.
//!
//! A build walks a [`assembler::ReportBuilder`] through its states: the title is
//! written first, then the molecular-system, computational-method and analysis-data
//! sections, and finally the document is rendered to PDF. Along the way:
//!
//! - [`formatter`] turns attribute values into text blocks, resolving labels through
//!   the metadata catalog;
//! - [`method`] decides which method-specific attribute groups a report shows;
//! - [`plotting`] generates plot images for tabular files, one recoverable outcome per
//!   file;
//! - [`grid`] arranges static images and plots into an image table;
//! - [`temp`] owns the directory the plots are written to and cleans it up.
//!
//! Schema problems in the experiment's metadata and I/O failures abort the build with
//! an [`error::EngineError`]; a plot that cannot be generated only produces a warning.

pub mod assembler;
pub mod config;
pub mod error;
pub mod formatter;
pub mod grid;
pub mod method;
pub mod plotting;
pub mod progress;
pub mod temp;
