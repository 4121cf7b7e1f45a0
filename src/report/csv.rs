use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use super::{create_parent, series_file, ReportError, ReportSink, Result};
use crate::{
    exposure::{Action, RetentionDecision, RetentionOutcome, SeriesReport},
    mtf::MtfReport,
};

#[derive(Serialize)]
struct SeriesRecord<'a> {
    file: &'a str,
    mean: f64,
    candidate: bool,
    action: &'a str,
}

#[derive(Serialize)]
struct SampleRecord {
    index: usize,
    value: f64,
}

/// Writes the reports as CSV files in a directory
///
/// Each series is written to `<series relative path>.csv`; each MTF analysis to
/// `<image>_<orientation>_{edge,profile,lsf,mtf}.csv`.
#[derive(Debug, Clone)]
pub struct CsvReport {
    path: PathBuf,
}
impl CsvReport {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
    fn write<R, I>(path: PathBuf, records: I) -> Result<()>
    where
        R: Serialize,
        I: IntoIterator<Item = R>,
    {
        let file = fs::File::create(&path).map_err(|e| ReportError::Create(path.clone(), e))?;
        let mut wtr = ::csv::Writer::from_writer(file);
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush().map_err(|e| ReportError::Create(path, e))?;
        Ok(())
    }
    fn write_samples<I>(&self, filename: &str, samples: I) -> Result<()>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let path = create_parent(self.path.join(filename))?;
        Self::write(
            path,
            samples
                .into_iter()
                .map(|(index, value)| SampleRecord { index, value }),
        )
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}
impl ReportSink for CsvReport {
    fn series(&mut self, report: &SeriesReport) -> Result<()> {
        let series = &report.series;
        let per_image = match &report.classification.decision {
            RetentionDecision::KeepSeries { per_image } => per_image.as_slice(),
            RetentionDecision::DeleteWholeSeries { .. } => &[],
        };
        let names: Vec<_> = series
            .measurements()
            .iter()
            .map(|m| m.file.to_string_lossy())
            .chain(series.skipped().iter().map(|s| s.file.to_string_lossy()))
            .collect();
        let measured = series.measurements().iter().enumerate().map(|(i, m)| {
            let (candidate, action) = match &report.outcome {
                RetentionOutcome::SeriesDeleted { removed: true, .. } => (true, "series deleted"),
                RetentionOutcome::SeriesDeleted { .. } => (true, "series could be deleted"),
                RetentionOutcome::Pruned(files) => match files.get(i).map(|f| f.action) {
                    Some(Action::Kept) => (false, "kept"),
                    Some(Action::Deleted) => (true, "deleted"),
                    Some(Action::WouldBeDeleted) => (true, "could be deleted"),
                    // a failed deletion leaves the last images unprocessed
                    None => (
                        per_image.get(i).copied().unwrap_or_default(),
                        "not processed",
                    ),
                },
            };
            (m.mean, candidate, action)
        });
        let skipped = series
            .skipped()
            .iter()
            .map(|_| (f64::NAN, false, "not loaded"));
        let records = names
            .iter()
            .zip(measured.chain(skipped))
            .map(|(file, (mean, candidate, action))| SeriesRecord {
                file,
                mean,
                candidate,
                action,
            });
        Self::write(series_file(&self.path, series, "csv")?, records)
    }
    fn transfer(&mut self, report: &MtfReport) -> Result<()> {
        let tf = report.transfer;
        let prefix = format!("{}_{}", report.name, report.profile.orientation());
        self.write_samples(
            &format!("{prefix}_edge.csv"),
            [(tf.edge, report.profile[tf.edge])],
        )?;
        self.write_samples(
            &format!("{prefix}_profile.csv"),
            report.profile.iter().copied().enumerate(),
        )?;
        self.write_samples(
            &format!("{prefix}_lsf.csv"),
            tf.lsf
                .iter()
                .copied()
                .enumerate()
                .map(|(i, v)| (tf.window.start + i, v)),
        )?;
        self.write_samples(
            &format!("{prefix}_mtf.csv"),
            tf.mtf.iter().copied().enumerate(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        exposure::{classify, FileOutcome, MeasuredSeries, Measurement, RetentionConfig},
        mtf::{EdgeProfile, Orientation, TransferFunction},
    };

    #[test]
    fn series_csv() {
        let dir = tempfile::tempdir().unwrap();
        let series = MeasuredSeries::new(
            "root/run-01",
            vec![Measurement::new("a.jpg", 1.), Measurement::new("b.jpg", 90.)],
        );
        let classification = classify(&series, &RetentionConfig::default()).unwrap();
        let report = SeriesReport {
            series,
            classification,
            outcome: RetentionOutcome::Pruned(vec![
                FileOutcome {
                    file: "a.jpg".into(),
                    mean: 1.,
                    action: Action::WouldBeDeleted,
                },
                FileOutcome {
                    file: "b.jpg".into(),
                    mean: 90.,
                    action: Action::Kept,
                },
            ]),
        };
        CsvReport::new(dir.path()).series(&report).unwrap();
        let contents = fs::read_to_string(dir.path().join("run-01.csv")).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "file,mean,candidate,action",
                "a.jpg,1.0,true,could be deleted",
                "b.jpg,90.0,false,kept"
            ]
        );
    }

    #[test]
    fn partially_pruned_series_csv() {
        let dir = tempfile::tempdir().unwrap();
        let series = MeasuredSeries::new(
            "root/run-02",
            vec![
                Measurement::new("a.jpg", 1.),
                Measurement::new("b.jpg", 2.),
                Measurement::new("c.jpg", 90.),
            ],
        );
        let classification = classify(&series, &RetentionConfig::default()).unwrap();
        let report = SeriesReport {
            series,
            classification,
            outcome: RetentionOutcome::Pruned(vec![FileOutcome {
                file: "a.jpg".into(),
                mean: 1.,
                action: Action::Deleted,
            }]),
        };
        CsvReport::new(dir.path()).series(&report).unwrap();
        let contents = fs::read_to_string(dir.path().join("run-02.csv")).unwrap();
        let lines: Vec<_> = contents.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "a.jpg,1.0,true,deleted",
                "b.jpg,2.0,true,not processed",
                "c.jpg,90.0,false,not processed"
            ]
        );
    }

    #[test]
    fn transfer_csv() {
        let dir = tempfile::tempdir().unwrap();
        let values: Vec<f64> = (0..10).map(|i| if i < 5 { 0. } else { 10. }).collect();
        let profile = EdgeProfile::new(Orientation::Vertical, 3, values);
        let transfer = TransferFunction::new(&profile, 4, 2).unwrap();
        let report = MtfReport {
            name: "edge",
            profile: &profile,
            transfer: &transfer,
        };
        CsvReport::new(dir.path().join("mtf")).transfer(&report).unwrap();
        for artifact in ["edge", "profile", "lsf", "mtf"] {
            assert!(dir
                .path()
                .join("mtf")
                .join(format!("edge_vertical_{artifact}.csv"))
                .is_file());
        }
        let lsf = fs::read_to_string(dir.path().join("mtf").join("edge_vertical_lsf.csv")).unwrap();
        assert_eq!(lsf.lines().count(), 1 + 3);
        assert!(lsf.contains("4,10.0"));
    }
}
