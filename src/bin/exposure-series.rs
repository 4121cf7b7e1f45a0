use std::{path::PathBuf, process::Child};

use indicatif::{ProgressBar, ProgressIterator};
use structopt::StructOpt;
use xray_qa::{
    exposure::{self, ExposureSeries, RetentionConfig},
    report::{CsvReport, LogReport, Reports},
    viewer::Viewer,
    ImageFileLoader,
};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "exposure-series",
    about = "Finds the best exposure of each image series and deletes the useless images"
)]
struct Opt {
    /// Root of the image series directories
    #[structopt(long, default_value = ".")]
    path: PathBuf,
    /// Image file extension
    #[structopt(long, default_value = "jpg")]
    extension: String,
    /// Brightness threshold in grey levels (also a percentage of the second darkest image)
    #[structopt(short, long, default_value = "5")]
    threshold: f64,
    /// Images are only deleted from series with more images than this
    #[structopt(long, default_value = "15")]
    min_count: usize,
    /// Delete files and directories, otherwise only report what could be deleted
    #[structopt(long)]
    delete: bool,
    /// Directory where the per-series reports are written (default: the root path)
    #[structopt(long)]
    report: Option<PathBuf>,
    /// Plot the mean of the images of each series
    #[structopt(short, long)]
    plot: bool,
    /// Viewer command opened on each remaining series, e.g. "ImageJ-linux64 -macro stack.ijm"
    #[structopt(long)]
    viewer: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let config = RetentionConfig::default()
        .threshold(opt.threshold)
        .min_count(opt.min_count)
        .enable_deletion(opt.delete);
    let report_path = opt.report.unwrap_or_else(|| opt.path.clone());
    let reports = Reports::new()
        .push(LogReport)
        .push(CsvReport::new(&report_path));
    #[cfg(feature = "plot")]
    let reports = if opt.plot {
        reports.push(xray_qa::report::PlotReport::new(&report_path))
    } else {
        reports
    };
    #[cfg(not(feature = "plot"))]
    if opt.plot {
        log::warn!("plotting requires the `plot` feature");
    }
    let mut reports = reports;
    let viewer = opt
        .viewer
        .as_deref()
        .and_then(Viewer::from_command_line);

    let series = ExposureSeries::walk(&opt.path, &opt.extension)?;
    println!("Found {} image series in {:?}", series.len(), opt.path);

    let pb = ProgressBar::new(series.len() as u64);
    let summary = exposure::process_all(
        series.iter().progress_with(pb),
        &ImageFileLoader,
        &config,
        &mut reports,
    );
    let mut viewers: Vec<Child> = match &viewer {
        Some(viewer) => series
            .iter()
            .filter(|s| !s.is_empty())
            .filter_map(|s| viewer.open(s.origin()))
            .collect(),
        None => vec![],
    };

    println!(
        "{} series processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );
    if opt.delete {
        println!(
            "{} series and {} images deleted",
            summary.deleted_series, summary.deleted_files
        );
    }
    // viewers still open are left running
    viewers.retain_mut(|child| !matches!(child.try_wait(), Ok(Some(_))));
    if !viewers.is_empty() {
        log::info!("{} viewer(s) still open", viewers.len());
    }
    Ok(())
}
