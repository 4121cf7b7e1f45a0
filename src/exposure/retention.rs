use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use super::{Classification, DeletionReason, MeasuredSeries, RetentionConfig, RetentionDecision};

#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    #[error("failed to remove series {series:?}")]
    RemoveSeries {
        series: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove {file:?} from series {series:?}, remaining deletions aborted")]
    RemoveFile {
        series: PathBuf,
        file: PathBuf,
        #[source]
        source: io::Error,
        /// Outcomes of the images handled before the failure
        pruned: Vec<FileOutcome>,
    },
}
impl RetentionError {
    /// Images of the series left before the failure, `None` if the series was not pruned
    pub fn partial_outcome(&self) -> Option<RetentionOutcome> {
        match self {
            RetentionError::RemoveFile { pruned, .. } => {
                Some(RetentionOutcome::Pruned(pruned.clone()))
            }
            RetentionError::RemoveSeries { .. } => None,
        }
    }
    /// Number of files removed from disk before the failure
    pub fn n_deleted(&self) -> usize {
        self.partial_outcome()
            .map_or(0, |outcome| outcome.n_deleted(0))
    }
}
type Result<T> = std::result::Result<T, RetentionError>;

/// What happened to an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Kept,
    Deleted,
    WouldBeDeleted,
}
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Kept => write!(f, "is kept"),
            Action::Deleted => write!(f, "is deleted"),
            Action::WouldBeDeleted => write!(f, "could be deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub mean: f64,
    pub action: Action,
}

/// Side effects of a retention decision
#[derive(Debug, Clone, PartialEq)]
pub enum RetentionOutcome {
    /// The series was discarded, `removed` tells if its directory is gone
    SeriesDeleted {
        reason: DeletionReason,
        removed: bool,
    },
    /// The series is kept, some images may have been removed
    Pruned(Vec<FileOutcome>),
}
impl RetentionOutcome {
    /// Number of files removed from disk, a removed series directory counts for `series_len`
    pub fn n_deleted(&self, series_len: usize) -> usize {
        match self {
            RetentionOutcome::SeriesDeleted { removed: true, .. } => series_len,
            RetentionOutcome::SeriesDeleted { removed: false, .. } => 0,
            RetentionOutcome::Pruned(files) => files
                .iter()
                .filter(|f| f.action == Action::Deleted)
                .count(),
        }
    }
}

/// Filesystem operations used by [RetentionExecutor]
pub trait Remover {
    fn remove_dir_all(&mut self, path: &Path) -> io::Result<()>;
    fn remove_file(&mut self, path: &Path) -> io::Result<()>;
}

/// Removes files and directories with [std::fs]
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;
impl Remover for FsRemover {
    fn remove_dir_all(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Applies retention decisions
///
/// Deletions are not transactional: a failure leaves the series partially pruned.
pub struct RetentionExecutor<R = FsRemover> {
    enable_deletion: bool,
    min_count: usize,
    remover: R,
}
impl RetentionExecutor<FsRemover> {
    pub fn new(config: &RetentionConfig) -> Self {
        Self::with_remover(config, FsRemover)
    }
}
impl<R: Remover> RetentionExecutor<R> {
    pub fn with_remover(config: &RetentionConfig, remover: R) -> Self {
        Self {
            enable_deletion: config.enable_deletion,
            min_count: config.min_count,
            remover,
        }
    }
    pub fn into_remover(self) -> R {
        self.remover
    }
    /// Deletes the series or the candidate images of the series
    pub fn apply(
        &mut self,
        series: &MeasuredSeries,
        classification: &Classification,
    ) -> Result<RetentionOutcome> {
        match &classification.decision {
            RetentionDecision::DeleteWholeSeries { reason } => {
                log::info!(
                    "{}: {reason} (min: {:.2}, max: {:.2})",
                    series.name(),
                    classification.minimum,
                    classification.maximum
                );
                if self.enable_deletion {
                    log::info!("deleting the whole directory {:?}", series.origin());
                    self.remover
                        .remove_dir_all(series.origin())
                        .map_err(|source| RetentionError::RemoveSeries {
                            series: series.origin().to_path_buf(),
                            source,
                        })?;
                } else {
                    log::info!("the whole directory {:?} could be deleted", series.origin());
                }
                Ok(RetentionOutcome::SeriesDeleted {
                    reason: *reason,
                    removed: self.enable_deletion,
                })
            }
            RetentionDecision::KeepSeries { per_image } => {
                if let Some(level) = classification.reference_level {
                    log::info!(
                        "{}: looking for images with a mean value between {:.2} and {:.2}",
                        series.name(),
                        classification.minimum,
                        level
                    );
                }
                let delete = self.enable_deletion && series.file_count() > self.min_count;
                let mut outcomes = Vec::with_capacity(per_image.len());
                for (measurement, &candidate) in series.measurements().iter().zip(per_image) {
                    let action = match (candidate, delete) {
                        (false, _) => Action::Kept,
                        (true, false) => Action::WouldBeDeleted,
                        (true, true) => match self.remover.remove_file(&measurement.file) {
                            Ok(()) => Action::Deleted,
                            Err(source) => {
                                return Err(RetentionError::RemoveFile {
                                    series: series.origin().to_path_buf(),
                                    file: measurement.file.clone(),
                                    source,
                                    pruned: outcomes,
                                })
                            }
                        },
                    };
                    log::debug!(
                        "{:?} has a mean of {:.2} and {action}",
                        measurement.file.file_name().unwrap_or_default(),
                        measurement.mean
                    );
                    outcomes.push(FileOutcome {
                        file: measurement.file.clone(),
                        mean: measurement.mean,
                        action,
                    });
                }
                Ok(RetentionOutcome::Pruned(outcomes))
            }
        }
    }
}
