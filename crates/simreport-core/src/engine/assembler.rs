use super::config::ReportConfig;
use super::error::EngineError;
use super::formatter::AttributeFormatter;
use super::grid::layout_grid;
use super::method::MethodSections;
use super::plotting::{PlotBatch, PlotPipeline};
use super::progress::{Progress, ProgressReporter};
use super::temp::TempArea;
use crate::core::catalog::codes::{self, TOPOLOGY_HEAD, TOPOLOGY_TAIL};
use crate::core::io::pdf::PdfWriter;
use crate::core::models::document::{
    Block, DocumentMetadata, Paragraph, ReportDocument, Section, SectionKind, TextStyle,
};
use crate::core::models::experiment::ExperimentRecord;
use crate::core::plot::PlotRenderer;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const CREATOR: &str = "simreport";
pub const SYSTEM_HEADING: &str = "Molecular system";
pub const ANALYSIS_HEADING: &str = "Analysis data";
pub const NO_ANALYSIS_DATA: &str = "No analysis data available";

static SILENT: ProgressReporter<'static> = ProgressReporter::new();

/// Position of a [`ReportBuilder`] in its build sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Initializing,
    TitleWritten,
    SectionsWritten,
    Finalized,
}

/// Who built the report and when. Fixing both makes builds reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub author: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportContext {
    pub fn new(author: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            generated_at,
        }
    }

    /// Current user (from `USER` or `USERNAME`) and the current time.
    pub fn from_environment() -> Self {
        let author = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self::new(author, Utc::now())
    }

    fn byline(&self) -> String {
        format!(
            "Report automatically generated by {} ({}, {})",
            CREATOR,
            self.author,
            self.generated_at.format("%a %b %d %H:%M:%S UTC %Y")
        )
    }
}

#[derive(Debug)]
pub struct ReportSummary {
    pub document: ReportDocument,
    pub output: PathBuf,
    pub plots: PlotBatch,
    pub images_embedded: usize,
    pub pages: usize,
}

/// Assembles the report of one experiment.
///
/// Calls must follow `write_title` → `write_sections` → `finalize`; anything
/// else fails with [`EngineError::InvalidState`]. `finalize` consumes the
/// builder.
pub struct ReportBuilder<'a> {
    experiment: &'a ExperimentRecord,
    formatter: AttributeFormatter<'a>,
    config: &'a ReportConfig,
    context: ReportContext,
    reporter: &'a ProgressReporter<'a>,
    document: ReportDocument,
    state: BuildState,
    temp: Option<TempArea>,
    plots: PlotBatch,
}

fn push_block(section: &mut Section, block: Option<Block>) {
    if let Some(block) = block {
        section.push(block);
    }
}

fn headed_section(kind: SectionKind, heading: impl Into<String>) -> Section {
    let mut section = Section::new(kind, Some(heading.into()));
    section.push(Block::Rule);
    section.push(Block::Spacer);
    section
}

impl<'a> ReportBuilder<'a> {
    pub fn new(
        experiment: &'a ExperimentRecord,
        formatter: AttributeFormatter<'a>,
        config: &'a ReportConfig,
        context: ReportContext,
    ) -> Self {
        let metadata = DocumentMetadata {
            title: experiment.name.clone(),
            author: context.author.clone(),
            creator: CREATOR.to_string(),
            created: context.generated_at,
        };
        Self {
            experiment,
            formatter,
            config,
            context,
            reporter: &SILENT,
            document: ReportDocument::new(metadata),
            state: BuildState::Initializing,
            temp: None,
            plots: PlotBatch::default(),
        }
    }

    pub fn with_reporter(mut self, reporter: &'a ProgressReporter<'a>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn document(&self) -> &ReportDocument {
        &self.document
    }

    pub fn plots(&self) -> &PlotBatch {
        &self.plots
    }

    fn expect_state(&self, expected: BuildState) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                expected,
                found: self.state,
            })
        }
    }

    fn note(&self, message: impl FnOnce() -> String) {
        if self.config.verbose {
            self.reporter.report(Progress::Message(message()));
        }
    }

    pub fn write_title(&mut self) -> Result<(), EngineError> {
        self.expect_state(BuildState::Initializing)?;
        self.reporter.report(Progress::PhaseStart { name: "Title" });
        self.note(|| "Adding title...".to_string());

        let mut section = Section::new(SectionKind::Title, None);
        section.push(Block::Text(Paragraph::styled(
            self.experiment.name.to_uppercase(),
            TextStyle::Title,
        )));
        section.push(Block::Text(Paragraph::styled(
            self.context.byline(),
            TextStyle::Byline,
        )));
        if let Some(description) = self
            .experiment
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        {
            section.push(Block::Spacer);
            section.push(Block::Text(Paragraph::styled(
                description,
                TextStyle::Abstract,
            )));
        }
        section.push(Block::Spacer);
        section.push(Block::Spacer);
        self.document.sections.push(section);

        self.state = BuildState::TitleWritten;
        self.reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    /// Writes the molecular-system, computational-method and analysis-data
    /// sections. Plots are generated here, into the temp area.
    pub fn write_sections(&mut self, renderer: Arc<dyn PlotRenderer>) -> Result<(), EngineError> {
        self.expect_state(BuildState::TitleWritten)?;
        self.reporter
            .report(Progress::PhaseStart { name: "Sections" });
        self.note(|| "Adding text...".to_string());
        let system = self.system_section()?;
        let method = self.method_section()?;
        self.reporter.report(Progress::PhaseFinish);

        let analysis = self.analysis_section(renderer)?;
        self.document.sections.extend([system, method, analysis]);
        self.state = BuildState::SectionsWritten;
        Ok(())
    }

    fn system_section(&self) -> Result<Section, EngineError> {
        let metadata = &self.experiment.metadata;
        let mut section = headed_section(SectionKind::MolecularSystem, SYSTEM_HEADING);
        for spec in TOPOLOGY_HEAD {
            push_block(&mut section, self.formatter.attribute(metadata, spec)?);
        }
        push_block(
            &mut section,
            self.formatter
                .composition(metadata, codes::MOLECULE_ATOMIC_COMPOSITION)?,
        );
        for spec in TOPOLOGY_TAIL {
            push_block(&mut section, self.formatter.attribute(metadata, spec)?);
        }
        section.push(Block::Spacer);
        Ok(section)
    }

    fn method_section(&self) -> Result<Section, EngineError> {
        let metadata = &self.experiment.metadata;
        let selection = MethodSections::select(metadata.first(codes::COMPUTATIONAL_METHOD_NAME));
        debug!(
            "Method '{}' enables attribute groups {:?}",
            selection.method, selection.groups
        );
        let mut section =
            headed_section(SectionKind::ComputationalMethod, selection.header.as_str());

        push_block(
            &mut section,
            self.formatter.values(
                codes::BOUNDARY_CONDITIONS,
                metadata.values(codes::BOUNDARY_CONDITIONS),
                "",
            )?,
        );
        if let Some(solvent) = metadata.first(codes::SOLVENT_TYPE).filter(|s| !s.is_empty()) {
            let value = match metadata.first(codes::IMPLICIT_SOLVENT_MODEL) {
                Some(model)
                    if !model.is_empty()
                        && solvent.trim().eq_ignore_ascii_case(codes::SOLVENT_IMPLICIT) =>
                {
                    format!("{solvent} ({model})")
                }
                _ => solvent.to_string(),
            };
            push_block(
                &mut section,
                self.formatter.values(codes::SOLVENT_TYPE, &[value], "")?,
            );
        }
        for spec in selection.attributes() {
            push_block(&mut section, self.formatter.attribute(metadata, spec)?);
        }
        section.push(Block::Spacer);
        Ok(section)
    }

    fn analysis_section(&mut self, renderer: Arc<dyn PlotRenderer>) -> Result<Section, EngineError> {
        let experiment = self.experiment;
        let mut section = headed_section(SectionKind::AnalysisData, ANALYSIS_HEADING);

        let mut images: Vec<PathBuf> = experiment.static_images().map(|f| f.path.clone()).collect();
        let static_count = images.len();
        if static_count > 0 {
            self.note(|| format!("Adding {static_count} images to the document..."));
        }

        // Prepared even without tabular files so that finalize always sweeps.
        let temp = TempArea::prepare(self.config)?;
        let tabular = experiment.tabular_files();
        if !tabular.is_empty() {
            self.reporter.report(Progress::PhaseStart { name: "Plots" });
            self.note(|| format!("Generating {} plots from CSV files...", tabular.len()));
            let pipeline = PlotPipeline::new(renderer, self.config);
            self.plots = pipeline.run(tabular, temp.path(), self.reporter);
            self.reporter.report(Progress::PhaseFinish);
        }
        self.temp = Some(temp);
        images.extend(self.plots.images());

        match layout_grid(images, self.config.columns, self.config.theme.image_padding) {
            Some(table) => section.push(Block::Table(table)),
            None if static_count == 0 && tabular.is_empty() => section.push(Block::Text(
                Paragraph::styled(NO_ANALYSIS_DATA, TextStyle::Normal),
            )),
            None => debug!("Every plot failed and there are no static images; no image table."),
        }
        Ok(section)
    }

    /// Renders the document to `output` and sweeps the temp area, whether or
    /// not rendering succeeded.
    pub fn finalize(mut self, output: &Path) -> Result<ReportSummary, EngineError> {
        self.expect_state(BuildState::SectionsWritten)?;
        self.reporter
            .report(Progress::PhaseStart { name: "Rendering" });

        let writer = PdfWriter::new(&self.config.theme, self.config.page);
        let written = writer.write(&self.document, output);
        if let Some(mut temp) = self.temp.take() {
            temp.sweep();
        }
        let rendered = written?;
        self.reporter.report(Progress::PhaseFinish);

        self.state = BuildState::Finalized;
        info!(
            "Report '{}' finalized: {} page(s), {} image(s), {} of {} plot(s).",
            self.document.metadata.title,
            rendered.pages,
            rendered.images,
            self.plots.generated(),
            self.plots.attempted()
        );
        Ok(ReportSummary {
            document: self.document,
            output: output.to_path_buf(),
            plots: self.plots,
            images_embedded: rendered.images,
            pages: rendered.pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{AttributeCatalog, AttributeResolver, LookupError};
    use crate::core::models::document::{Cell, ImageTable, Inline, LabeledList};
    use crate::core::models::experiment::AnalysisFile;
    use crate::core::models::metadata::AttributeValueSet;
    use crate::engine::config::ReportConfigBuilder;
    use crate::engine::plotting::tests::StubRenderer;
    use chrono::TimeZone;
    use std::fs;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};

    fn context() -> ReportContext {
        ReportContext::new(
            "alice",
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    fn config(temp: &TempDir) -> ReportConfig {
        ReportConfigBuilder::new()
            .temp_dir(temp.path().join("plots"))
            .build()
            .unwrap()
    }

    fn build_sections(
        experiment: &ExperimentRecord,
        resolver: &dyn AttributeResolver,
        config: &ReportConfig,
    ) -> Result<ReportDocument, EngineError> {
        let mut builder =
            ReportBuilder::new(experiment, AttributeFormatter::new(resolver), config, context());
        builder.write_title()?;
        builder.write_sections(Arc::new(StubRenderer))?;
        Ok(builder.document().clone())
    }

    fn section_text(document: &ReportDocument, kind: SectionKind) -> String {
        let section = document.section(kind).unwrap();
        let mut out = String::new();
        for block in &section.blocks {
            match block {
                Block::Text(p) => {
                    out.push_str(&p.plain_text());
                    out.push('\n');
                }
                Block::List(LabeledList { label, items }) => {
                    out.push_str(label);
                    out.push('\n');
                    for item in items {
                        out.push_str(&format!("- {item}\n"));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn table(document: &ReportDocument) -> Option<&ImageTable> {
        document
            .section(SectionKind::AnalysisData)
            .unwrap()
            .tables()
            .next()
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(6, 4, image::Rgb([0, 128, 0]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn title_section_has_name_byline_and_abstract() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("Lysozyme run").with_description("10 ns NPT");
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();

        assert_eq!(document.metadata.title, "Lysozyme run");
        assert_eq!(document.metadata.author, "alice");
        assert_eq!(document.metadata.creator, "simreport");

        let title = &document.sections[0];
        assert_eq!(title.kind, SectionKind::Title);
        let texts: Vec<(String, TextStyle)> = title
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Text(p) => match &p.inlines[0] {
                    Inline::Text { text, style } => Some((text.clone(), *style)),
                    Inline::Break => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                ("LYSOZYME RUN".to_string(), TextStyle::Title),
                (
                    "Report automatically generated by simreport (alice, Wed May 01 12:00:00 UTC 2024)"
                        .to_string(),
                    TextStyle::Byline
                ),
                ("10 ns NPT".to_string(), TextStyle::Abstract),
            ]
        );
    }

    #[test]
    fn blank_description_is_omitted() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x").with_description("   ");
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();
        assert!(!section_text(&document, SectionKind::Title).contains("   "));
        assert_eq!(
            document.sections[0]
                .blocks
                .iter()
                .filter(|b| matches!(b, Block::Text(_)))
                .count(),
            2
        );
    }

    #[test]
    fn system_section_lists_present_attributes_only() {
        let temp = tempdir().unwrap();
        let mut metadata = AttributeValueSet::new()
            .with(codes::MOLECULE_TYPE, "Protein")
            .with(codes::MOLECULE_ATOMIC_COMPOSITION, "C:6 H:12 O:6")
            .with(codes::MOLECULE_ATOMIC_WEIGHT, "180.16");
        metadata.set_values(codes::RESIDUE_NON_STD, ["HEM", "NAG"]);
        let experiment = ExperimentRecord::new("x").with_metadata(metadata);
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();

        let text = section_text(&document, SectionKind::MolecularSystem);
        assert_eq!(
            text,
            "Molecule type: Protein\n\
             Non-standard residues\n- HEM\n- NAG\n\
             Molecular composition: C6H12O6\n\n\
             Molecular weight: 180.16 g/mol\n"
        );
        assert!(!text.contains("Number of atoms"));
    }

    #[test]
    fn qm_mm_renders_both_groups_and_quantum_only_renders_one() {
        let temp = tempdir().unwrap();
        let metadata = |method: &str| {
            AttributeValueSet::new()
                .with(codes::COMPUTATIONAL_METHOD_NAME, method)
                .with(codes::FORCE_FIELD, "AMBER")
                .with(codes::QM_BASIS_SET, "6-31G*")
                .with(codes::REFERENCE_TEMPERATURE, "300")
        };
        let catalog = AttributeCatalog::builtin();

        let hybrid = ExperimentRecord::new("x").with_metadata(metadata("QM/MM"));
        let document = build_sections(&hybrid, &catalog, &config(&temp)).unwrap();
        let text = section_text(&document, SectionKind::ComputationalMethod);
        assert!(text.contains("Force field: AMBER"));
        assert!(text.contains("Reference temperature: 300 K"));
        assert!(text.contains("Basis set: 6-31G*"));
        assert_eq!(
            document.section(SectionKind::ComputationalMethod).unwrap().heading.as_deref(),
            Some("QM/MM")
        );

        let quantum = ExperimentRecord::new("x").with_metadata(metadata("Quantum mechanics"));
        let document = build_sections(&quantum, &catalog, &config(&temp)).unwrap();
        let text = section_text(&document, SectionKind::ComputationalMethod);
        assert!(!text.contains("Force field"));
        assert!(text.contains("Basis set: 6-31G*"));
    }

    #[test]
    fn unrecognized_method_still_shows_boundary_and_solvent() {
        let temp = tempdir().unwrap();
        let metadata = AttributeValueSet::new()
            .with(codes::COMPUTATIONAL_METHOD_NAME, "Monte Carlo")
            .with(codes::BOUNDARY_CONDITIONS, "periodic")
            .with(codes::SOLVENT_TYPE, "Implicit")
            .with(codes::IMPLICIT_SOLVENT_MODEL, "GB")
            .with(codes::FORCE_FIELD, "AMBER");
        let experiment = ExperimentRecord::new("x").with_metadata(metadata);
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();

        let text = section_text(&document, SectionKind::ComputationalMethod);
        assert_eq!(text, "Boundary conditions: periodic\nSolvent: Implicit (GB)\n");
    }

    #[test]
    fn explicit_solvent_ignores_implicit_model() {
        let temp = tempdir().unwrap();
        let metadata = AttributeValueSet::new()
            .with(codes::SOLVENT_TYPE, "explicit")
            .with(codes::IMPLICIT_SOLVENT_MODEL, "GB");
        let experiment = ExperimentRecord::new("x").with_metadata(metadata);
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();
        let section = document.section(SectionKind::ComputationalMethod).unwrap();
        assert_eq!(section.heading.as_deref(), Some("Computational method"));
        assert_eq!(
            section_text(&document, SectionKind::ComputationalMethod),
            "Solvent: explicit\n"
        );
    }

    #[test]
    fn schema_errors_abort_the_build() {
        let temp = tempdir().unwrap();
        let malformed = ExperimentRecord::new("x").with_metadata(
            AttributeValueSet::new().with(codes::MOLECULE_ATOMIC_COMPOSITION, "C6"),
        );
        let err = build_sections(&malformed, &AttributeCatalog::builtin(), &config(&temp))
            .unwrap_err();
        assert!(matches!(err, EngineError::Format { .. }));

        let unknown = ExperimentRecord::new("x")
            .with_metadata(AttributeValueSet::new().with(codes::MOLECULE_TYPE, "Protein"));
        let err = build_sections(&unknown, &AttributeCatalog::new(), &config(&temp)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Lookup(LookupError::UnknownAttribute { ref code }) if code == codes::MOLECULE_TYPE
        ));
    }

    #[test]
    fn empty_experiment_shows_placeholder() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x");
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();
        assert_eq!(
            section_text(&document, SectionKind::AnalysisData),
            format!("{NO_ANALYSIS_DATA}\n")
        );
        assert!(table(&document).is_none());
    }

    #[test]
    fn static_images_precede_generated_plots_and_failures_are_skipped() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x")
            .with_file(AnalysisFile::new("/data/snapshot.png"))
            .with_file(AnalysisFile::new("/data/cover.jpg"))
            .with_file(AnalysisFile::new("/data/rmsd.csv"))
            .with_file(AnalysisFile::new("/data/bad.csv"))
            .with_file(AnalysisFile::new("/data/energy.csv"));
        let config = config(&temp);
        let document = build_sections(&experiment, &AttributeCatalog::builtin(), &config).unwrap();

        let table = table(&document).unwrap();
        assert_eq!(table.image_count(), 4);
        let paths: Vec<PathBuf> = table
            .cells()
            .filter_map(|c| match c {
                Cell::Image(cell) => Some(cell.path.clone()),
                Cell::Empty => None,
            })
            .collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/data/cover.jpg"),
                PathBuf::from("/data/snapshot.png"),
                config.temp_dir.join("rmsd.csv_plot.png"),
                config.temp_dir.join("energy.csv_plot.png"),
            ]
        );
        assert!(!section_text(&document, SectionKind::AnalysisData).contains(NO_ANALYSIS_DATA));
    }

    #[test]
    fn padding_counts_static_images_and_plots_together() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x")
            .with_file(AnalysisFile::new("/data/a.png"))
            .with_file(AnalysisFile::new("/data/b.png"))
            .with_file(AnalysisFile::new("/data/c.png"))
            .with_file(AnalysisFile::new("/data/d.csv"))
            .with_file(AnalysisFile::new("/data/e.csv"));
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();
        let table = table(&document).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2][1], Cell::Empty);
    }

    #[test]
    fn only_failed_plots_leave_no_table_and_no_placeholder() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x").with_file(AnalysisFile::new("/data/bad.csv"));
        let document =
            build_sections(&experiment, &AttributeCatalog::builtin(), &config(&temp)).unwrap();
        assert!(table(&document).is_none());
        assert_eq!(section_text(&document, SectionKind::AnalysisData), "");
    }

    #[test]
    fn plot_failure_is_logged_with_the_file_name() {
        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);
        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x")
            .with_file(AnalysisFile::new("/data/good.csv"))
            .with_file(AnalysisFile::new("/data/bad.csv"));
        let config = config(&temp);
        tracing::subscriber::with_default(subscriber, || {
            build_sections(&experiment, &AttributeCatalog::builtin(), &config).unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("WARN"));
        assert!(logs.contains("/data/bad.csv"));
        assert!(!logs.contains("'/data/good.csv' could not"));
    }

    #[test]
    fn calls_out_of_order_are_rejected() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x");
        let catalog = AttributeCatalog::builtin();
        let config = config(&temp);

        let mut builder =
            ReportBuilder::new(&experiment, AttributeFormatter::new(&catalog), &config, context());
        let err = builder.write_sections(Arc::new(StubRenderer)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                expected: BuildState::TitleWritten,
                found: BuildState::Initializing
            }
        ));

        builder.write_title().unwrap();
        assert!(matches!(
            builder.write_title().unwrap_err(),
            EngineError::InvalidState {
                expected: BuildState::Initializing,
                found: BuildState::TitleWritten
            }
        ));

        let err = builder.finalize(&temp.path().join("out.pdf")).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                expected: BuildState::SectionsWritten,
                found: BuildState::TitleWritten
            }
        ));
    }

    #[test]
    fn identical_inputs_produce_identical_documents() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x")
            .with_metadata(
                AttributeValueSet::new()
                    .with(codes::COMPUTATIONAL_METHOD_NAME, "MD")
                    .with(codes::FORCE_FIELD, "CHARMM36"),
            )
            .with_file(AnalysisFile::new("/data/a.png"))
            .with_file(AnalysisFile::new("/data/rmsd.csv"));
        let catalog = AttributeCatalog::builtin();
        let config = config(&temp);

        let first = build_sections(&experiment, &catalog, &config).unwrap();
        let second = build_sections(&experiment, &catalog, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn verbose_builds_emit_messages() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x").with_file(AnalysisFile::new("/data/a.csv"));
        let catalog = AttributeCatalog::builtin();
        let mut config = config(&temp);
        config.verbose = true;

        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let reporter = ProgressReporter::with_callback(Box::new(move |e| {
            if let Progress::Message(m) = e {
                sink.lock().unwrap().push(m);
            }
        }));
        let mut builder =
            ReportBuilder::new(&experiment, AttributeFormatter::new(&catalog), &config, context())
                .with_reporter(&reporter);
        builder.write_title().unwrap();
        builder.write_sections(Arc::new(StubRenderer)).unwrap();

        let messages = messages.lock().unwrap();
        assert!(messages.iter().any(|m| m == "Generating 1 plots from CSV files..."));
    }

    #[test]
    fn finalize_writes_pdf_and_sweeps_generated_plots() {
        let temp = tempdir().unwrap();
        let inputs = tempdir().unwrap();
        let snapshot = write_png(inputs.path(), "snapshot.png");
        let experiment = ExperimentRecord::new("Lysozyme")
            .with_metadata(AttributeValueSet::new().with(codes::FORCE_FIELD, "AMBER"))
            .with_file(AnalysisFile::new(&snapshot))
            .with_file(AnalysisFile::new(inputs.path().join("rmsd.csv")))
            .with_file(AnalysisFile::new(inputs.path().join("bad.csv")));
        let catalog = AttributeCatalog::builtin();
        let config = config(&temp);
        let output = temp.path().join("report.pdf");

        let mut builder =
            ReportBuilder::new(&experiment, AttributeFormatter::new(&catalog), &config, context());
        builder.write_title().unwrap();
        builder.write_sections(Arc::new(StubRenderer)).unwrap();
        assert!(config.temp_dir.join("rmsd.csv_plot.png").is_file());
        let summary = builder.finalize(&output).unwrap();

        assert_eq!(summary.output, output);
        assert_eq!(summary.images_embedded, 2);
        assert_eq!(summary.plots.generated(), 1);
        assert_eq!(summary.plots.failures().count(), 1);
        assert_eq!(fs::read_dir(&config.temp_dir).unwrap().count(), 0);
        assert!(snapshot.is_file());

        let pdf = lopdf::Document::load(&output).unwrap();
        assert_eq!(pdf.get_pages().len(), summary.pages);
        let info_id = pdf.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = pdf.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Lysozyme");
        assert_eq!(info.get(b"Author").unwrap().as_str().unwrap(), b"alice");
    }

    #[test]
    fn finalize_sweeps_stale_files_without_tabular_data() {
        let temp = tempdir().unwrap();
        let config = config(&temp);
        fs::create_dir_all(&config.temp_dir).unwrap();
        let stale = config.temp_dir.join("stale_plot.png");
        fs::write(&stale, b"x").unwrap();

        let experiment = ExperimentRecord::new("x");
        let catalog = AttributeCatalog::builtin();
        let mut builder =
            ReportBuilder::new(&experiment, AttributeFormatter::new(&catalog), &config, context());
        builder.write_title().unwrap();
        builder.write_sections(Arc::new(StubRenderer)).unwrap();
        builder.finalize(&temp.path().join("report.pdf")).unwrap();

        assert!(!stale.exists());
        assert_eq!(fs::read_dir(&config.temp_dir).unwrap().count(), 0);
    }

    #[test]
    fn failed_render_still_sweeps_and_leaves_no_output() {
        let temp = tempdir().unwrap();
        let experiment = ExperimentRecord::new("x")
            .with_file(AnalysisFile::new("/definitely/missing.png"))
            .with_file(AnalysisFile::new("/data/rmsd.csv"));
        let catalog = AttributeCatalog::builtin();
        let config = config(&temp);
        let output = temp.path().join("report.pdf");

        let mut builder =
            ReportBuilder::new(&experiment, AttributeFormatter::new(&catalog), &config, context());
        builder.write_title().unwrap();
        builder.write_sections(Arc::new(StubRenderer)).unwrap();
        let err = builder.finalize(&output).unwrap_err();

        assert!(matches!(err, EngineError::Render(_)));
        assert!(!output.exists());
        assert_eq!(fs::read_dir(&config.temp_dir).unwrap().count(), 0);
    }
}
