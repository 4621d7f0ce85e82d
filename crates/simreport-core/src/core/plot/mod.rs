//! Plot generation seam: the renderer trait used by the engine and a default
//! line-chart implementation for CSV data.

pub mod line;
pub mod renderer;

pub use line::LinePlotRenderer;
pub use renderer::{AxisMetadata, PlotError, PlotImageFormat, PlotRenderer, PlotRequest};
