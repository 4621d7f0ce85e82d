use super::load_catalog;
use crate::cli::BuildArgs;
use crate::config::PartialReportConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use simreport::{
    core::io::manifest::ExperimentManifest,
    core::plot::LinePlotRenderer,
    engine::assembler::{ReportContext, ReportSummary},
    engine::progress::ProgressReporter,
    workflows,
};
use std::sync::Arc;
use tracing::{info, warn};

pub fn run(args: BuildArgs, partial_config: PartialReportConfig) -> Result<()> {
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building report from {}...", args.input.display());
    let summary = build_report(&args, partial_config, &reporter)?;

    let failed = summary.plots.attempted() - summary.plots.generated();
    if failed > 0 {
        warn!("{} plot(s) could not be generated and were left out.", failed);
        println!(
            "Warning: {} of {} plot(s) could not be generated.",
            failed,
            summary.plots.attempted()
        );
    }
    println!(
        "✓ Report ({} page(s), {} image(s)) written to: {}",
        summary.pages,
        summary.images_embedded,
        summary.output.display()
    );
    Ok(())
}

fn build_report(
    args: &BuildArgs,
    partial_config: PartialReportConfig,
    reporter: &ProgressReporter,
) -> Result<ReportSummary> {
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(args)?;

    info!("Loading experiment manifest from {:?}", &args.input);
    let experiment =
        ExperimentManifest::load(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    let catalog = load_catalog(args.catalog.as_deref())?;

    let mut context = ReportContext::from_environment();
    if let Some(author) = &args.author {
        context.author = author.clone();
    }

    info!("Invoking the core report workflow...");
    let summary = workflows::report::run(
        &experiment,
        &catalog,
        Arc::new(LinePlotRenderer::default()),
        &config,
        context,
        &args.output,
        reporter,
    )?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn build_args(dir: &Path, extra: &[&str]) -> BuildArgs {
        let input = dir.join("experiment.toml");
        let output = dir.join("report.pdf");
        let temp = dir.join("tmp");
        let mut args = vec![
            "simreport",
            "build",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-t",
            temp.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Build(args) => args,
            _ => panic!("Expected 'build' subcommand"),
        }
    }

    fn write_experiment(dir: &Path) {
        fs::write(
            dir.join("experiment.toml"),
            r#"
            name = "Alanine dipeptide"
            description = "Gas phase scan"

            [metadata]
            COMPUTATIONAL_METHOD_NAME = "QM"
            QM_METHOD_NAME = "DFT"
            QM_BASIS_SET = "6-31G*"
            "#,
        )
        .unwrap();
    }

    #[test]
    fn builds_report_with_author_and_catalog_overrides() {
        let dir = tempdir().unwrap();
        write_experiment(dir.path());
        let catalog = dir.path().join("catalog.toml");
        fs::write(&catalog, "QM_BASIS_SET = { term = \"Orbital basis\" }\n").unwrap();

        let args = build_args(
            dir.path(),
            &["--author", "Ada", "--catalog", catalog.to_str().unwrap()],
        );
        let summary = build_report(
            &args,
            PartialReportConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(args.output.is_file());
        assert!(fs::read(&args.output).unwrap().starts_with(b"%PDF-"));
        assert_eq!(summary.document.metadata.author, "Ada");
        assert_eq!(summary.images_embedded, 0);
        assert!(format!("{:?}", summary.document).contains("Orbital basis"));
    }

    #[test]
    fn missing_manifest_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let args = build_args(dir.path(), &[]);
        let result = build_report(&args, PartialReportConfig::default(), &ProgressReporter::new());
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
        assert!(!args.output.exists());
    }

    #[test]
    fn malformed_catalog_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        write_experiment(dir.path());
        let catalog = dir.path().join("catalog.toml");
        fs::write(&catalog, "QM_BASIS_SET = 3\n").unwrap();

        let args = build_args(dir.path(), &["--catalog", catalog.to_str().unwrap()]);
        let result = build_report(&args, PartialReportConfig::default(), &ProgressReporter::new());
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
        assert!(!args.output.exists());
    }
}
