use super::config::ReportConfig;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::experiment::AnalysisFile;
use crate::core::plot::{AxisMetadata, PlotError, PlotImageFormat, PlotRenderer, PlotRequest};
use std::collections::HashSet;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of generating the plot of one tabular file.
#[derive(Debug)]
pub struct PlotOutcome {
    pub source: PathBuf,
    pub name: String,
    pub result: Result<PathBuf, PlotError>,
}

/// Outcomes of one pipeline run, in source-file order.
#[derive(Debug, Default)]
pub struct PlotBatch {
    outcomes: Vec<PlotOutcome>,
}

impl PlotBatch {
    pub fn outcomes(&self) -> &[PlotOutcome] {
        &self.outcomes
    }

    /// Generated images in source-file order.
    pub fn images(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().cloned())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PlotOutcome, &PlotError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    pub fn generated(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Turns tabular analysis files into plot images.
///
/// A failing file never aborts the run: renderer errors, panics, timeouts and
/// missing output files all become failed [`PlotOutcome`]s.
pub struct PlotPipeline {
    renderer: Arc<dyn PlotRenderer>,
    timeout: Option<Duration>,
    format: PlotImageFormat,
}

impl PlotPipeline {
    pub fn new(renderer: Arc<dyn PlotRenderer>, config: &ReportConfig) -> Self {
        Self {
            renderer,
            timeout: config.plot_timeout,
            format: config.plot_format,
        }
    }

    /// Builds one request per file. Destination stems are `<temp>/<name>_plot`;
    /// a stem already taken in this batch gets a `_<n>` suffix.
    pub fn requests(&self, files: &[AnalysisFile], temp_dir: &Path) -> Vec<PlotRequest> {
        let mut used = HashSet::new();
        files
            .iter()
            .map(|file| {
                let base = format!("{}_plot", file.name);
                let mut stem = base.clone();
                let mut n = 2;
                while !used.insert(stem.clone()) {
                    stem = format!("{base}_{n}");
                    n += 1;
                }
                PlotRequest {
                    source: file.path.clone(),
                    title: file.name.clone(),
                    axes: AxisMetadata::from_metadata(&file.metadata),
                    dest_stem: temp_dir.join(stem),
                    format: self.format,
                }
            })
            .collect()
    }

    pub fn run(
        &self,
        files: &[AnalysisFile],
        temp_dir: &Path,
        reporter: &ProgressReporter,
    ) -> PlotBatch {
        if files.is_empty() {
            return PlotBatch::default();
        }
        let requests: Vec<(String, PlotRequest)> = files
            .iter()
            .map(|f| f.name.clone())
            .zip(self.requests(files, temp_dir))
            .collect();

        info!("Generating {} plot(s) from tabular files.", requests.len());
        reporter.report(Progress::TaskStart {
            total_steps: requests.len() as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let iterator = requests.into_iter();

        #[cfg(feature = "parallel")]
        let iterator = requests.into_par_iter();

        let outcomes: Vec<PlotOutcome> = iterator
            .map(|(name, request)| {
                let result = self.render_one(&request);
                reporter.report(Progress::TaskIncrement);
                PlotOutcome {
                    source: request.source,
                    name,
                    result,
                }
            })
            .collect();

        reporter.report(Progress::TaskFinish);

        for (outcome, error) in outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
        {
            warn!(
                "Plot for '{}' could not be generated: {}",
                outcome.source.display(),
                error
            );
            reporter.report(Progress::Warning(format!(
                "Plot for '{}' could not be generated",
                outcome.source.display()
            )));
        }

        let batch = PlotBatch { outcomes };
        debug!(
            "{} of {} plot(s) generated.",
            batch.generated(),
            batch.attempted()
        );
        batch
    }

    fn render_one(&self, request: &PlotRequest) -> Result<PathBuf, PlotError> {
        let result = match self.timeout {
            None => panic::catch_unwind(AssertUnwindSafe(|| self.renderer.render(request)))
                .unwrap_or(Err(PlotError::Panicked)),
            Some(timeout) => self.render_with_timeout(request, timeout),
        };
        result.and_then(|path| {
            if path.is_file() {
                Ok(path)
            } else {
                Err(PlotError::MissingOutput(path))
            }
        })
    }

    // A renderer that outlives the timeout keeps running on its detached thread.
    // Once the receiver is gone it deletes whatever it wrote, since the temp area
    // may already have been swept.
    fn render_with_timeout(
        &self,
        request: &PlotRequest,
        timeout: Duration,
    ) -> Result<PathBuf, PlotError> {
        let renderer = Arc::clone(&self.renderer);
        let owned = request.clone();
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("simreport-plot".to_string())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(&owned)));
                if tx.send(result).is_err() {
                    let output = owned.output_path();
                    if fs::remove_file(&output).is_ok() {
                        debug!("Removed late plot output {:?}", output);
                    }
                }
            })
            .map_err(|e| PlotError::Io {
                path: request.source.to_string_lossy().to_string(),
                source: e,
            })?;

        match rx.recv_timeout(timeout) {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(PlotError::Panicked),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(PlotError::Timeout(timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(PlotError::Panicked),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::catalog::codes::{DATA_LABELS, DATA_UNITS};
    use crate::core::models::metadata::AttributeValueSet;
    use crate::engine::config::ReportConfigBuilder;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Writes a tiny PNG for every request whose file name does not contain "bad".
    pub(crate) struct StubRenderer;

    impl PlotRenderer for StubRenderer {
        fn render(&self, request: &PlotRequest) -> Result<PathBuf, PlotError> {
            let name = request.source.file_name().unwrap_or_default();
            if name.to_string_lossy().contains("bad") {
                return Err(PlotError::Render("stub failure".to_string()));
            }
            let output = request.output_path();
            image::RgbImage::from_pixel(4, 3, image::Rgb([255, 0, 0]))
                .save(&output)
                .map_err(|e| PlotError::Render(e.to_string()))?;
            Ok(output)
        }
    }

    struct SleepyRenderer(Duration);

    impl PlotRenderer for SleepyRenderer {
        fn render(&self, request: &PlotRequest) -> Result<PathBuf, PlotError> {
            thread::sleep(self.0);
            Ok(request.output_path())
        }
    }

    /// Writes its image only after the pipeline has given up on it.
    struct LateRenderer(Duration);

    impl PlotRenderer for LateRenderer {
        fn render(&self, request: &PlotRequest) -> Result<PathBuf, PlotError> {
            thread::sleep(self.0);
            StubRenderer.render(request)
        }
    }

    struct PanickingRenderer;

    impl PlotRenderer for PanickingRenderer {
        fn render(&self, _request: &PlotRequest) -> Result<PathBuf, PlotError> {
            panic!("renderer exploded");
        }
    }

    struct LyingRenderer;

    impl PlotRenderer for LyingRenderer {
        fn render(&self, request: &PlotRequest) -> Result<PathBuf, PlotError> {
            Ok(request.output_path())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer(Mutex<Vec<PlotRequest>>);

    impl PlotRenderer for RecordingRenderer {
        fn render(&self, request: &PlotRequest) -> Result<PathBuf, PlotError> {
            self.0.lock().unwrap().push(request.clone());
            StubRenderer.render(request)
        }
    }

    fn config(temp: &Path, timeout: Option<Duration>) -> ReportConfig {
        ReportConfigBuilder::new()
            .temp_dir(temp.to_path_buf())
            .plot_timeout(timeout)
            .build()
            .unwrap()
    }

    fn csv(name: &str) -> AnalysisFile {
        AnalysisFile::new(PathBuf::from("/data").join(name))
    }

    #[test]
    fn one_failing_file_does_not_stop_the_others() {
        let temp = tempdir().unwrap();
        let pipeline = PlotPipeline::new(Arc::new(StubRenderer), &config(temp.path(), None));
        let files = [csv("rmsd.csv"), csv("bad.csv"), csv("energy.csv")];

        let batch = pipeline.run(&files, temp.path(), &ProgressReporter::new());
        assert_eq!(batch.attempted(), 3);
        assert_eq!(batch.generated(), 2);
        assert_eq!(
            batch.images(),
            vec![
                temp.path().join("rmsd.csv_plot.png"),
                temp.path().join("energy.csv_plot.png"),
            ]
        );
        let failures: Vec<_> = batch.failures().map(|(o, _)| o.name.as_str()).collect();
        assert_eq!(failures, ["bad.csv"]);
    }

    #[test]
    fn failures_are_reported_as_warnings_in_source_order() {
        let temp = tempdir().unwrap();
        let pipeline = PlotPipeline::new(Arc::new(StubRenderer), &config(temp.path(), None));
        let files = [csv("bad_a.csv"), csv("ok.csv"), csv("bad_b.csv")];

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = ProgressReporter::with_callback(Box::new(move |e| {
            if let Progress::Warning(text) = e {
                sink.lock().unwrap().push(text);
            }
        }));
        pipeline.run(&files, temp.path(), &reporter);

        let warnings = events.lock().unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("bad_a.csv"));
        assert!(warnings[1].contains("bad_b.csv"));
    }

    #[test]
    fn duplicate_names_get_unique_stems() {
        let temp = tempdir().unwrap();
        let pipeline = PlotPipeline::new(Arc::new(StubRenderer), &config(temp.path(), None));
        let files = [
            AnalysisFile::new("/run1/rmsd.csv"),
            AnalysisFile::new("/run2/rmsd.csv"),
            AnalysisFile::new("/run3/rmsd.csv"),
        ];
        let stems: Vec<PathBuf> = pipeline
            .requests(&files, temp.path())
            .into_iter()
            .map(|r| r.dest_stem)
            .collect();
        assert_eq!(
            stems,
            [
                temp.path().join("rmsd.csv_plot"),
                temp.path().join("rmsd.csv_plot_2"),
                temp.path().join("rmsd.csv_plot_3"),
            ]
        );
    }

    #[test]
    fn requests_carry_axis_metadata_and_format() {
        let temp = tempdir().unwrap();
        let renderer = Arc::new(RecordingRenderer::default());
        let pipeline = PlotPipeline::new(renderer.clone(), &config(temp.path(), None));
        let metadata = AttributeValueSet::new()
            .with(DATA_LABELS, "Time,RMSD")
            .with(DATA_UNITS, "ns,nm");
        let files = [csv("rmsd.csv").with_metadata(metadata)];

        pipeline.run(&files, temp.path(), &ProgressReporter::new());
        let seen = renderer.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].axes.labels, ["Time", "RMSD"]);
        assert_eq!(seen[0].axes.units, ["ns", "nm"]);
        assert_eq!(seen[0].format, PlotImageFormat::Png);
        assert_eq!(seen[0].title, "rmsd.csv");
    }

    #[test]
    fn slow_renderer_times_out() {
        let temp = tempdir().unwrap();
        let pipeline = PlotPipeline::new(
            Arc::new(SleepyRenderer(Duration::from_millis(500))),
            &config(temp.path(), Some(Duration::from_millis(20))),
        );
        let batch = pipeline.run(&[csv("slow.csv")], temp.path(), &ProgressReporter::new());
        let (_, error) = batch.failures().next().unwrap();
        assert!(matches!(error, PlotError::Timeout(_)));
    }

    #[test]
    fn timed_out_renderer_removes_its_late_output() {
        let temp = tempdir().unwrap();
        let pipeline = PlotPipeline::new(
            Arc::new(LateRenderer(Duration::from_millis(300))),
            &config(temp.path(), Some(Duration::from_millis(20))),
        );
        let batch = pipeline.run(&[csv("slow.csv")], temp.path(), &ProgressReporter::new());
        assert!(matches!(
            batch.failures().next().unwrap().1,
            PlotError::Timeout(_)
        ));

        thread::sleep(Duration::from_millis(900));
        assert!(!temp.path().join("slow.csv_plot.png").exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn panics_and_missing_outputs_are_per_file_failures() {
        let temp = tempdir().unwrap();
        for timeout in [None, Some(Duration::from_secs(5))] {
            let pipeline =
                PlotPipeline::new(Arc::new(PanickingRenderer), &config(temp.path(), timeout));
            let batch = pipeline.run(&[csv("a.csv")], temp.path(), &ProgressReporter::new());
            assert!(matches!(
                batch.failures().next().unwrap().1,
                PlotError::Panicked
            ));
        }

        let pipeline = PlotPipeline::new(Arc::new(LyingRenderer), &config(temp.path(), None));
        let batch = pipeline.run(&[csv("a.csv")], temp.path(), &ProgressReporter::new());
        assert!(matches!(
            batch.failures().next().unwrap().1,
            PlotError::MissingOutput(_)
        ));
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let temp = tempdir().unwrap();
        let pipeline = PlotPipeline::new(Arc::new(StubRenderer), &config(temp.path(), None));
        let batch = pipeline.run(&[], temp.path(), &ProgressReporter::new());
        assert!(batch.is_empty());
        assert!(batch.images().is_empty());
    }
}
