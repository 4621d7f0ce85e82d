//! # Core Module
//!
//! Stateless building blocks of a report build.
//!
//! - **Data models** ([`models`]) - experiment records, attribute-value sets, file formats
//!   and the in-memory report document.
//! - **Metadata catalog** ([`catalog`]) - attribute codes, canonical terms and the
//!   [`catalog::AttributeResolver`] seam.
//! - **Plotting** ([`plot`]) - the [`plot::PlotRenderer`] seam and a CSV line-chart renderer.
//! - **File I/O** ([`io`]) - manifest loading and PDF writing.
//!
//! Nothing in this module keeps state across builds; orchestration lives in
//! [`crate::engine`].

pub mod catalog;
pub mod io;
pub mod models;
pub mod plot;
