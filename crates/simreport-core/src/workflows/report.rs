use crate::core::catalog::AttributeResolver;
use crate::core::models::experiment::ExperimentRecord;
use crate::core::plot::PlotRenderer;
use crate::engine::assembler::{ReportBuilder, ReportContext, ReportSummary};
use crate::engine::config::ReportConfig;
use crate::engine::error::EngineError;
use crate::engine::formatter::AttributeFormatter;
use crate::engine::progress::ProgressReporter;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Builds the report of `experiment` and writes it to `output`.
///
/// Generated plots are removed from the temp area before this returns, on
/// success and on failure.
#[instrument(skip_all, name = "report_workflow", fields(experiment = %experiment.name))]
pub fn run(
    experiment: &ExperimentRecord,
    resolver: &dyn AttributeResolver,
    renderer: Arc<dyn PlotRenderer>,
    config: &ReportConfig,
    context: ReportContext,
    output: &Path,
    reporter: &ProgressReporter,
) -> Result<ReportSummary, EngineError> {
    info!(
        "Building report with {} analysis file(s) into {:?}.",
        experiment.file_count(),
        output
    );

    let mut builder = ReportBuilder::new(
        experiment,
        AttributeFormatter::new(resolver),
        config,
        context,
    )
    .with_reporter(reporter);

    builder.write_title()?;
    builder.write_sections(renderer)?;
    let summary = builder.finalize(output)?;

    for (outcome, _) in summary.plots.failures() {
        info!("Plot skipped for '{}'.", outcome.name);
    }
    Ok(summary)
}
