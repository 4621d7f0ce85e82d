use super::renderer::{AxisMetadata, PlotError, PlotRenderer, PlotRequest, path_string};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Numeric content of a CSV file, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub x_caption: String,
    pub y_caption: String,
    pub series: Vec<Series>,
}

impl PlotData {
    fn bounds(&self) -> (Range<f64>, Range<f64>) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        (widen(x_min, x_max), widen(y_min, y_max))
    }
}

fn widen(min: f64, max: f64) -> Range<f64> {
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0)..(max + 1.0)
    } else {
        let margin = (max - min) * 0.05;
        (min - margin)..(max + margin)
    }
}

/// Reads a CSV file into plot series.
///
/// The first column is the X axis and every further column is a Y series. A single
/// column is plotted against its row index. A first row that does not parse as
/// numbers is treated as a header; its names label the axes when `axes` has none.
/// Non-finite values such as `NaN` or `inf` are rejected.
pub fn load_plot_data(path: &Path, axes: &AxisMetadata) -> Result<PlotData, PlotError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PlotError::Csv {
            path: path_string(path),
            source: e,
        })?;

    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| PlotError::Csv {
            path: path_string(path),
            source: e,
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let parsed: Result<Vec<f64>, (usize, String)> = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                field
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| (col, field.to_string()))
            })
            .collect();
        match parsed {
            Ok(values) => rows.push(values),
            Err(_) if index == 0 => {
                header = Some(record.iter().map(str::to_string).collect());
            }
            Err((column, value)) => {
                return Err(PlotError::InvalidValue {
                    path: path_string(path),
                    row: index + 1,
                    column: column + 1,
                    value,
                });
            }
        }
    }

    if rows.is_empty() {
        return Err(PlotError::NoData {
            path: path_string(path),
        });
    }

    let name_of = |column: usize, fallback: String| -> String {
        axes.label(column)
            .map(str::to_string)
            .or_else(|| header.as_ref().and_then(|h| h.get(column).cloned()))
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
    };
    let caption_of = |column: usize, fallback: String| -> String {
        let name = name_of(column, fallback);
        match axes.unit(column) {
            Some(unit) => format!("{name} ({unit})"),
            None => name,
        }
    };

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let (x_caption, series) = if width == 1 {
        let points = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i as f64, r[0]))
            .collect();
        (
            "Index".to_string(),
            vec![Series {
                name: name_of(0, "Value".to_string()),
                points,
            }],
        )
    } else {
        let series = (1..width)
            .map(|column| Series {
                name: name_of(column, format!("Series {column}")),
                points: rows
                    .iter()
                    .filter(|r| r.len() > column)
                    .map(|r| (r[0], r[column]))
                    .collect(),
            })
            .collect();
        (caption_of(0, "x".to_string()), series)
    };

    let y_caption = if width <= 2 {
        caption_of(if width == 1 { 0 } else { 1 }, "Value".to_string())
    } else {
        axes.unit(1)
            .map(|u| format!("Value ({u})"))
            .unwrap_or_else(|| "Value".to_string())
    };

    Ok(PlotData {
        x_caption,
        y_caption,
        series,
    })
}

/// Draws CSV files as line charts with `plotters`.
#[derive(Debug, Clone, Copy)]
pub struct LinePlotRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for LinePlotRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

fn render_error(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}

impl PlotRenderer for LinePlotRenderer {
    fn render(&self, request: &PlotRequest) -> Result<PathBuf, PlotError> {
        let data = load_plot_data(&request.source, &request.axes)?;
        let output = request.output_path();
        debug!(
            "Drawing {} series from {:?} into {:?}",
            data.series.len(),
            request.source,
            output
        );

        let (x_range, y_range) = data.bounds();
        let root = BitMapBackend::new(&output, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&request.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_desc(data.x_caption.as_str())
            .y_desc(data.y_caption.as_str())
            .draw()
            .map_err(render_error)?;

        for (idx, series) in data.series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let style = ShapeStyle::from(&color).stroke_width(2);
            chart
                .draw_series(LineSeries::new(series.points.iter().copied(), style))
                .map_err(render_error)?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        if data.series.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(render_error)?;
        }

        root.present().map_err(render_error)?;
        drop(chart);
        drop(root);

        if !output.exists() {
            return Err(PlotError::MissingOutput(output));
        }
        Ok(output)
    }
}
