//! Reporting sinks for series evaluations and MTF analyses

use std::{
    error::Error,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    exposure::{MeasuredSeries, RetentionOutcome, SeriesReport},
    mtf::MtfReport,
};

mod csv;
#[cfg(feature = "plot")]
mod plot;
pub use self::csv::CsvReport;
#[cfg(feature = "plot")]
pub use plot::PlotReport;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create report {0:?}")]
    Create(PathBuf, #[source] io::Error),
    #[error("failed to write CSV report")]
    Csv(#[from] ::csv::Error),
    #[error("failed to draw {0}")]
    Plot(String),
}
type Result<T> = std::result::Result<T, ReportError>;

/// Creates the directory of a file and returns the file path
fn create_parent(path: PathBuf) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ReportError::Create(parent.to_path_buf(), e))?;
    }
    Ok(path)
}

/// `<dir>/<series relative path>.<extension>`
///
/// Nested series with the same directory name are written in separate sub-directories.
fn series_file(dir: &Path, series: &MeasuredSeries, extension: &str) -> Result<PathBuf> {
    let mut filename = series.relative_path().as_os_str().to_os_string();
    filename.push(".");
    filename.push(extension);
    create_parent(dir.join(filename))
}

/// Consumer of the evaluation results
pub trait ReportSink {
    fn series(&mut self, report: &SeriesReport) -> Result<()>;
    fn transfer(&mut self, report: &MtfReport) -> Result<()>;
    /// Reports a failed evaluation of `subject`
    fn failure(&mut self, _subject: &Path, _error: &(dyn Error + 'static)) {}
}

/// Human readable report through [log]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReport;
impl ReportSink for LogReport {
    fn series(&mut self, report: &SeriesReport) -> Result<()> {
        let SeriesReport {
            series,
            classification,
            outcome,
        } = report;
        log::info!(
            "{}: the mean value of {} images varies between {:.2} and {:.2}",
            series.name(),
            series.measurements().len(),
            classification.minimum,
            classification.maximum
        );
        log::info!(
            "{}: a maximum of {:.2} was found in image {} which corresponds to {:?}",
            series.name(),
            classification.maximum,
            classification.best_exposure,
            report.best_exposure().file.file_name().unwrap_or_default()
        );
        if let Some(level) = classification.reference_level {
            log::info!(
                "{}: {} image(s) below the deletion level {:.2}",
                series.name(),
                classification
                    .decision
                    .n_candidates(series.measurements().len()),
                level
            );
        }
        if !series.skipped().is_empty() {
            log::warn!(
                "{}: {} image(s) could not be loaded",
                series.name(),
                series.skipped().len()
            );
        }
        match outcome {
            RetentionOutcome::SeriesDeleted { reason, removed } => log::info!(
                "{}: {reason}, the series {}",
                series.name(),
                if *removed {
                    "is deleted"
                } else {
                    "could be deleted"
                }
            ),
            RetentionOutcome::Pruned(files) => {
                for file in files {
                    log::info!(
                        "{:?} has a mean of {:.2} and {}",
                        file.file.file_name().unwrap_or_default(),
                        file.mean,
                        file.action
                    );
                }
            }
        }
        Ok(())
    }
    fn transfer(&mut self, report: &MtfReport) -> Result<()> {
        let tf = report.transfer;
        let (k, peak) = tf
            .lsf
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(k, m), (i, v)| {
                if v > m {
                    (i, v)
                } else {
                    (k, m)
                }
            });
        log::info!(
            "{} {} profile #{}: edge at {} (window {:?}), LSF peak {:.3} at {}, MTF(0) {:.3}",
            report.name,
            report.profile.orientation(),
            report.profile.position(),
            tf.edge,
            tf.window,
            peak,
            tf.window.start + k,
            tf.mtf.first().copied().unwrap_or_default()
        );
        Ok(())
    }
    fn failure(&mut self, subject: &Path, error: &(dyn Error + 'static)) {
        let mut message = format!("{subject:?}: {error}");
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        log::error!("{message}");
    }
}

/// Forwards the reports to a collection of sinks
#[derive(Default)]
pub struct Reports(Vec<Box<dyn ReportSink>>);
impl Reports {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn push<S: ReportSink + 'static>(mut self, sink: S) -> Self {
        self.0.push(Box::new(sink));
        self
    }
}
impl ReportSink for Reports {
    fn series(&mut self, report: &SeriesReport) -> Result<()> {
        self.0.iter_mut().try_for_each(|sink| sink.series(report))
    }
    fn transfer(&mut self, report: &MtfReport) -> Result<()> {
        self.0.iter_mut().try_for_each(|sink| sink.transfer(report))
    }
    fn failure(&mut self, subject: &Path, error: &(dyn Error + 'static)) {
        self.0
            .iter_mut()
            .for_each(|sink| sink.failure(subject, error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        exposure::{classify, ExposureSeries, Measurement, RetentionConfig},
        ImageFileLoader,
    };
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone, Default)]
    struct Counter(Rc<RefCell<(usize, usize)>>);
    impl ReportSink for Counter {
        fn series(&mut self, _: &SeriesReport) -> Result<()> {
            self.0.borrow_mut().0 += 1;
            Ok(())
        }
        fn transfer(&mut self, _: &MtfReport) -> Result<()> {
            Ok(())
        }
        fn failure(&mut self, _: &Path, _: &(dyn Error + 'static)) {
            self.0.borrow_mut().1 += 1;
        }
    }

    #[test]
    fn nested_series_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = MeasuredSeries::measure(
            &ExposureSeries::new("root/a/run1", vec![]).named("a/run1"),
            &ImageFileLoader,
        );
        let b = MeasuredSeries::new("root/b/run1", vec![]);
        let a_file = series_file(dir.path(), &a, "csv").unwrap();
        assert_eq!(a_file, dir.path().join("a").join("run1.csv"));
        assert!(dir.path().join("a").is_dir());
        assert_eq!(
            series_file(dir.path(), &b, "svg").unwrap(),
            dir.path().join("run1.svg")
        );
    }

    #[test]
    fn fan_out() {
        let counter = Counter::default();
        let mut reports = Reports::new()
            .push(LogReport)
            .push(counter.clone())
            .push(counter.clone());
        let series = MeasuredSeries::new(
            "s",
            vec![Measurement::new("s/0.jpg", 1.), Measurement::new("s/1.jpg", 90.)],
        );
        let config = RetentionConfig::default();
        let classification = classify(&series, &config).unwrap();
        let report = SeriesReport {
            series,
            classification,
            outcome: RetentionOutcome::Pruned(vec![]),
        };
        reports.series(&report).unwrap();
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        reports.failure(Path::new("s"), &err);
        assert_eq!(*counter.0.borrow(), (2, 2));
    }
}
