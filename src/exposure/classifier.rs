use std::fmt;

use itertools::Itertools;

use super::{ExposureError, MeasuredSeries, RetentionConfig};

type Result<T> = std::result::Result<T, ExposureError>;

/// Reason for discarding a whole series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionReason {
    /// The brightest image mean is below the threshold
    AllBelowThreshold,
    /// The brightest and the darkest image means differ by less than the threshold
    InsufficientDynamicRange,
}
impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionReason::AllBelowThreshold => write!(f, "all images below threshold"),
            DeletionReason::InsufficientDynamicRange => write!(f, "insufficient dynamic range"),
        }
    }
}

/// Retention decision for a series
#[derive(Debug, Clone, PartialEq)]
pub enum RetentionDecision {
    DeleteWholeSeries { reason: DeletionReason },
    /// `per_image[i]` is `true` if the i-th image is a deletion candidate
    KeepSeries { per_image: Vec<bool> },
}
impl RetentionDecision {
    /// Number of images marked for deletion, the whole series counts for all of them
    pub fn n_candidates(&self, series_len: usize) -> usize {
        match self {
            RetentionDecision::DeleteWholeSeries { .. } => series_len,
            RetentionDecision::KeepSeries { per_image } => {
                per_image.iter().filter(|&&c| c).count()
            }
        }
    }
}

/// Outcome of the series classification
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub decision: RetentionDecision,
    /// Index of the brightest image
    pub best_exposure: usize,
    pub minimum: f64,
    pub maximum: f64,
    /// Means below this level are deletion candidates
    pub reference_level: Option<f64>,
}

/// Classifies a series from the mean brightness of its images
///
/// The rules are evaluated in order, the first one that applies wins:
///  1. the brightest image is below the threshold: delete the series,
///  2. brightest and darkest images differ by less than the threshold: delete the series,
///  3. keep the series but mark for deletion the images darker than the
///     second darkest image brightened by threshold percent.
pub fn classify(series: &MeasuredSeries, config: &RetentionConfig) -> Result<Classification> {
    let means = series.means();
    classify_means(&means, config.threshold)
        .ok_or_else(|| ExposureError::EmptySeries(series.origin().to_path_buf()))
}

/// Classifies a sequence of means, `None` if the sequence is empty
pub fn classify_means(means: &[f64], threshold: f64) -> Option<Classification> {
    let (minimum, maximum) = means.iter().copied().minmax().into_option()?;
    // first of equal maxima
    let best_exposure = means.iter().position_min_by(|a, b| b.total_cmp(a))?;

    let (decision, reference_level) = if maximum < threshold {
        (
            RetentionDecision::DeleteWholeSeries {
                reason: DeletionReason::AllBelowThreshold,
            },
            None,
        )
    } else if maximum - minimum < threshold {
        (
            RetentionDecision::DeleteWholeSeries {
                reason: DeletionReason::InsufficientDynamicRange,
            },
            None,
        )
    } else {
        let reference = deletion_reference(means, threshold)?;
        (
            RetentionDecision::KeepSeries {
                per_image: means.iter().map(|&mean| mean < reference).collect(),
            },
            Some(reference),
        )
    };
    Some(Classification {
        decision,
        best_exposure,
        minimum,
        maximum,
        reference_level,
    })
}

/// Second darkest mean inflated by `threshold` percent
///
/// A single mean is its own reference.
pub fn deletion_reference(means: &[f64], threshold: f64) -> Option<f64> {
    let rank = 1usize.min(means.len().checked_sub(1)?);
    let second_smallest = means
        .iter()
        .copied()
        .sorted_by(|a, b| a.total_cmp(b))
        .nth(rank)?;
    Some(second_smallest * (1. + threshold / 100.))
}
