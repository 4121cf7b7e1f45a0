use std::{io, path::PathBuf};

use anyhow::Context;
use structopt::StructOpt;
use xray_qa::{
    mtf::{MtfConfig, MtfReport, Orientation, PickPoint, Prompt, Scripted, Selector},
    report::{CsvReport, LogReport, ReportSink, Reports},
    ImageFileLoader,
};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "mtf",
    about = "Knife-edge line spread and modulation transfer functions"
)]
struct Opt {
    /// Knife-edge image
    image: PathBuf,
    /// Row of the horizontal profile
    #[structopt(long, default_value = "1400")]
    row: usize,
    /// Column of the vertical profile
    #[structopt(long, default_value = "1400")]
    column: usize,
    /// Ask for the pick point on the terminal
    #[structopt(long)]
    pick: bool,
    /// Edge position, located automatically if not set
    #[structopt(long)]
    edge: Option<usize>,
    /// Ask for the edge position on the terminal, overrides `--edge`
    #[structopt(long)]
    pick_edge: bool,
    /// Half width of the window around the edge
    #[structopt(long, default_value = "100")]
    edge_range: usize,
    /// Profile(s) to analyze: horizontal, vertical or both
    #[structopt(long, default_value = "vertical", possible_values = &["horizontal", "vertical", "both"])]
    orientation: String,
    /// Directory where the LSF and MTF are written (default: current directory)
    #[structopt(long, default_value = ".")]
    report: PathBuf,
    /// Plot the edge window, the LSF and the MTF
    #[structopt(short, long)]
    plot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let orientations = match opt.orientation.as_str() {
        "horizontal" => vec![Orientation::Horizontal],
        "both" => vec![Orientation::Horizontal, Orientation::Vertical],
        _ => vec![Orientation::Vertical],
    };
    let mut config = MtfConfig::default()
        .edge_range(opt.edge_range)
        .pick(PickPoint::new(opt.row, opt.column))
        .orientations(orientations);
    if opt.pick {
        config = config.pick_manually();
    }
    if opt.edge.is_some() || opt.pick_edge {
        config = config.edge_manually();
    }

    let mut scripted = Scripted::default();
    if let (Some(edge), false) = (opt.edge, opt.pick_edge) {
        for _ in &config.orientations {
            scripted = scripted.edge(edge);
        }
    }
    let mut selector: Box<dyn Selector> = if opt.pick || opt.pick_edge {
        Box::new(scripted.or_else(Prompt::new(io::stdin().lock(), io::stderr())))
    } else {
        Box::new(scripted)
    };

    let analysis = xray_qa::analyze_image(&opt.image, &ImageFileLoader, &config, &mut *selector)
        .with_context(|| format!("MTF analysis of {:?} failed", opt.image))?;

    let name = opt
        .image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("mtf"));
    let reports = Reports::new()
        .push(LogReport)
        .push(CsvReport::new(&opt.report));
    #[cfg(feature = "plot")]
    let reports = if opt.plot {
        reports.push(xray_qa::report::PlotReport::new(&opt.report))
    } else {
        reports
    };
    #[cfg(not(feature = "plot"))]
    if opt.plot {
        log::warn!("plotting requires the `plot` feature");
    }
    let mut reports = reports;

    let mut n_failed = 0;
    for edge in &analysis.edges {
        match &edge.result {
            Ok(transfer) => reports.transfer(&MtfReport {
                name: &name,
                profile: analysis.profiles.get(edge.orientation),
                transfer,
            })?,
            Err(e) => {
                reports.failure(&opt.image, e);
                n_failed += 1;
            }
        }
    }
    if n_failed == analysis.edges.len() {
        anyhow::bail!("no profile of {:?} could be analyzed", opt.image);
    }
    Ok(())
}
