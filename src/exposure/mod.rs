//! Exposure series evaluation and retention
//!
//! A series is measured image by image ([MeasuredSeries::measure]), classified
//! ([classify]) and the classification is applied to the files on disk
//! ([RetentionExecutor]).

use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{
    frame::FrameLoader,
    report::{ReportError, ReportSink},
};

mod classifier;
mod retention;
mod series;
mod statistic;
pub use classifier::{
    classify, classify_means, deletion_reference, Classification, DeletionReason,
    RetentionDecision,
};
pub use retention::{
    Action, FileOutcome, FsRemover, Remover, RetentionError, RetentionExecutor, RetentionOutcome,
};
pub use series::ExposureSeries;
pub use statistic::mean_brightness;

#[derive(Debug, thiserror::Error)]
pub enum ExposureError {
    #[error("no image could be measured in series {0:?}")]
    EmptySeries(PathBuf),
    #[error("failed to read directory {path:?}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0:?} is not a valid UTF-8 path")]
    NonUtf8Path(PathBuf),
    #[error("invalid series file pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to list series files")]
    Glob(#[from] glob::GlobError),
    #[error(transparent)]
    Retention(#[from] RetentionError),
    #[error("failed to report series")]
    Report(#[from] ReportError),
}
type Result<T> = std::result::Result<T, ExposureError>;

/// Retention settings
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionConfig {
    /// Brightness threshold in grey levels, also used as a percentage for the deletion reference
    pub threshold: f64,
    /// Images are only deleted from series with more images than `min_count`
    pub min_count: usize,
    pub enable_deletion: bool,
}
impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            threshold: 5.,
            min_count: 15,
            enable_deletion: false,
        }
    }
}
impl RetentionConfig {
    pub fn threshold(self, threshold: f64) -> Self {
        Self { threshold, ..self }
    }
    pub fn min_count(self, min_count: usize) -> Self {
        Self { min_count, ..self }
    }
    pub fn enable_deletion(self, enable_deletion: bool) -> Self {
        Self {
            enable_deletion,
            ..self
        }
    }
}

/// Image mean brightness
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub file: PathBuf,
    pub mean: f64,
}
impl Measurement {
    pub fn new<P: Into<PathBuf>>(file: P, mean: f64) -> Self {
        Self {
            file: file.into(),
            mean,
        }
    }
}

/// Image that could not be measured
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub file: PathBuf,
    pub error: String,
}

/// Mean brightness of the images of a series, in acquisition order
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredSeries {
    origin: PathBuf,
    name: PathBuf,
    measurements: Vec<Measurement>,
    skipped: Vec<SkippedFile>,
}
impl MeasuredSeries {
    pub fn new<P: Into<PathBuf>>(origin: P, measurements: Vec<Measurement>) -> Self {
        let origin = origin.into();
        Self {
            name: series::base_name(&origin),
            origin,
            measurements,
            skipped: vec![],
        }
    }
    /// Computes the mean brightness of each image of the series
    ///
    /// Images that fail to load are skipped.
    pub fn measure<L: FrameLoader + ?Sized>(series: &ExposureSeries, loader: &L) -> Self {
        let mut measurements = Vec::with_capacity(series.len());
        let mut skipped = vec![];
        for file in series.files() {
            match loader.load(file).and_then(|frame| mean_brightness(&frame)) {
                Ok(mean) => measurements.push(Measurement::new(file.clone(), mean)),
                Err(e) => {
                    log::warn!("skipping {:?}: {e}", file);
                    skipped.push(SkippedFile {
                        file: file.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        Self {
            origin: series.origin().to_path_buf(),
            name: series.relative_path().to_path_buf(),
            measurements,
            skipped,
        }
    }
    pub fn origin(&self) -> &Path {
        &self.origin
    }
    /// Series name, e.g. `session-2/stack-1`
    pub fn name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
    /// Series directory relative to the walked root
    pub fn relative_path(&self) -> &Path {
        &self.name
    }
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }
    pub fn means(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.mean).collect()
    }
    /// Number of files in the series, including the skipped ones
    pub fn file_count(&self) -> usize {
        self.measurements.len() + self.skipped.len()
    }
}

/// Series measurements, classification and retention outcome
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesReport {
    pub series: MeasuredSeries,
    pub classification: Classification,
    pub outcome: RetentionOutcome,
}
impl SeriesReport {
    /// The brightest image
    pub fn best_exposure(&self) -> &Measurement {
        &self.series.measurements()[self.classification.best_exposure]
    }
}

/// Measures, classifies and prunes a series, then hands the result to `sink`
///
/// If a deletion fails, the partially pruned series is handed to `sink`
/// before the error is returned.
pub fn process_series<L, S>(
    series: &ExposureSeries,
    loader: &L,
    config: &RetentionConfig,
    sink: &mut S,
) -> Result<SeriesReport>
where
    L: FrameLoader + ?Sized,
    S: ReportSink + ?Sized,
{
    log::info!(
        "Getting the mean of {} images from {}",
        series.len(),
        series.relative_path().display()
    );
    let measured = MeasuredSeries::measure(series, loader);
    let classification = classify(&measured, config)?;
    let outcome = match RetentionExecutor::new(config).apply(&measured, &classification) {
        Ok(outcome) => outcome,
        Err(e) => {
            // the images removed before the failure are reported all the same
            if let Some(outcome) = e.partial_outcome() {
                sink.series(&SeriesReport {
                    series: measured,
                    classification,
                    outcome,
                })?;
            }
            return Err(e.into());
        }
    };
    let report = SeriesReport {
        series: measured,
        classification,
        outcome,
    };
    sink.series(&report)?;
    Ok(report)
}

/// Tally of a batch of series
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deleted_series: usize,
    pub deleted_files: usize,
}

/// Processes series one after the other
///
/// A series that fails is reported to the sink and does not stop the batch:
/// an empty series is skipped, a failed deletion leaves the series partially pruned.
pub fn process_all<'a, I, L, S>(
    series: I,
    loader: &L,
    config: &RetentionConfig,
    sink: &mut S,
) -> Summary
where
    I: IntoIterator<Item = &'a ExposureSeries>,
    L: FrameLoader + ?Sized,
    S: ReportSink + ?Sized,
{
    let mut summary = Summary::default();
    for series in series {
        if !series.origin().is_dir() {
            log::info!("{:?} no longer exists, skipping", series.origin());
            summary.skipped += 1;
            continue;
        }
        match process_series(series, loader, config, sink) {
            Ok(report) => {
                summary.processed += 1;
                match &report.outcome {
                    RetentionOutcome::SeriesDeleted { removed: true, .. } => {
                        summary.deleted_series += 1
                    }
                    outcome => {
                        summary.deleted_files += outcome.n_deleted(report.series.file_count())
                    }
                }
            }
            Err(e @ ExposureError::EmptySeries(_)) => {
                if series.is_empty() {
                    log::info!("{:?} has no image, skipping", series.origin());
                } else {
                    sink.failure(series.origin(), &e);
                }
                summary.skipped += 1;
            }
            Err(e) => {
                if let ExposureError::Retention(retention) = &e {
                    summary.deleted_files += retention.n_deleted();
                }
                sink.failure(series.origin(), &e);
                summary.failed += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, FrameError};

    fn loader(path: &Path) -> std::result::Result<Frame, FrameError> {
        let stem = path.file_stem().unwrap().to_str().unwrap();
        if stem == "corrupt" {
            return Err(FrameError::Empty);
        }
        let value: f64 = stem.parse().unwrap();
        Frame::gray(2, 2, vec![value; 4])
    }

    #[test]
    fn decode_failures_are_skipped() {
        let series = ExposureSeries::new(
            "s",
            ["s/10.jpg", "s/corrupt.jpg", "s/80.jpg"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        );
        let measured = MeasuredSeries::measure(&series, &loader);
        assert_eq!(measured.means(), vec![10., 80.]);
        assert_eq!(measured.skipped().len(), 1);
        assert_eq!(measured.file_count(), 3);
        assert_eq!(measured.measurements()[1].file, PathBuf::from("s/80.jpg"));
    }

    #[test]
    fn empty_series_is_an_error() {
        let series = ExposureSeries::new("s", vec![PathBuf::from("s/corrupt.jpg")]);
        let measured = MeasuredSeries::measure(&series, &loader);
        let err = classify(&measured, &RetentionConfig::default()).unwrap_err();
        assert!(matches!(err, ExposureError::EmptySeries(path) if path == Path::new("s")));
    }

    #[test]
    fn config_builder() {
        let config = RetentionConfig::default()
            .threshold(10.)
            .min_count(16)
            .enable_deletion(true);
        assert_eq!(
            config,
            RetentionConfig {
                threshold: 10.,
                min_count: 16,
                enable_deletion: true
            }
        );
    }
}
