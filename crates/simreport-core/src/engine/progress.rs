/// Events emitted while a report is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A build phase ("Title", "Sections", "Plots", "Rendering") begins.
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A countable task begins, e.g. rendering `total_steps` plots.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    /// Human-readable status line; only emitted for verbose builds.
    Message(String),
    /// A recoverable problem, such as a plot that could not be generated.
    Warning(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub const fn new() -> Self {
        Self { callback: None }
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn callback_receives_events_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reporter = ProgressReporter::with_callback(Box::new(move |e| {
            sink.lock().unwrap().push(e);
        }));
        reporter.report(Progress::PhaseStart { name: "Title" });
        reporter.report(Progress::Message("hello".to_string()));
        reporter.report(Progress::PhaseFinish);

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::PhaseStart { name: "Title" },
                Progress::Message("hello".to_string()),
                Progress::PhaseFinish,
            ]
        );
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::TaskIncrement);
    }
}
