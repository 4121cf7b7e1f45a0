use std::path::PathBuf;

use plotters::prelude::*;

use super::{create_parent, series_file, ReportError, ReportSink, Result};
use crate::{exposure::SeriesReport, mtf::MtfReport};

fn plot_err<E: std::fmt::Display>(what: &str) -> impl Fn(E) -> ReportError + '_ {
    move |e| ReportError::Plot(format!("{what}: {e}"))
}

fn minmax(values: &[f64]) -> (f64, f64) {
    let max_value = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_value = values.iter().cloned().fold(f64::INFINITY, f64::min);
    (min_value, max_value)
}

/// SVG figures of the reports
///
/// Series figures are saved as `<series relative path>.svg` and MTF figures as
/// `<image>_<orientation>.svg`.
#[derive(Debug, Clone)]
pub struct PlotReport {
    path: PathBuf,
}
impl PlotReport {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
    fn figure(&self, filename: String) -> Result<PathBuf> {
        create_parent(self.path.join(filename))
    }
}
impl ReportSink for PlotReport {
    fn series(&mut self, report: &SeriesReport) -> Result<()> {
        let series = &report.series;
        let filename = series_file(&self.path, series, "svg")?;
        let means = series.means();
        let err = plot_err("series figure");

        let plot = SVGBackend::new(&filename, (1024, 576)).into_drawing_area();
        plot.fill(&WHITE).map_err(&err)?;
        let mut chart = ChartBuilder::on(&plot)
            .caption(
                format!("Mean of {} images in {}", means.len(), series.name()),
                ("sans-serif", 20),
            )
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .margin(10)
            .build_cartesian_2d(
                -0.5..means.len() as f64 - 0.5,
                0f64..report.classification.maximum.max(1.) * 1.1,
            )
            .map_err(&err)?;
        chart
            .configure_mesh()
            .x_desc("Image index")
            .y_desc("Mean")
            .draw()
            .map_err(&err)?;

        let mut colors = colorous::TABLEAU10.iter().cycle();
        let mut next_color = || {
            let color = colors.next().unwrap_or(&colorous::TABLEAU10[0]);
            RGBColor(color.r, color.g, color.b)
        };

        let rgb = next_color();
        chart
            .draw_series(LineSeries::new(
                means.iter().enumerate().map(|(i, &m)| (i as f64, m)),
                &rgb,
            ))
            .map_err(&err)?
            .label("Mean value")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &rgb));
        chart
            .draw_series(
                means
                    .iter()
                    .enumerate()
                    .map(|(i, &m)| Circle::new((i as f64, m), 3, rgb.filled())),
            )
            .map_err(&err)?;

        let x_range = (-0.5, means.len() as f64 - 0.5);
        let hline = |y: f64| vec![(x_range.0, y), (x_range.1, y)];
        let rgb = next_color();
        chart
            .draw_series(LineSeries::new(hline(report.classification.maximum), &rgb))
            .map_err(&err)?
            .label(format!("Max@{:.2}", report.classification.maximum))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &rgb));
        if let Some(level) = report.classification.reference_level {
            let rgb = next_color();
            chart
                .draw_series(LineSeries::new(hline(level), &rgb))
                .map_err(&err)?
                .label(format!("Deletion<{level:.2}"))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &rgb));
        }
        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .position(SeriesLabelPosition::LowerRight)
            .draw()
            .map_err(&err)?;
        plot.present().map_err(&err)?;
        Ok(())
    }
    fn transfer(&mut self, report: &MtfReport) -> Result<()> {
        let tf = report.transfer;
        let filename = self.figure(format!(
            "{}_{}.svg",
            report.name,
            report.profile.orientation()
        ))?;
        let err = plot_err("MTF figure");

        let plot = SVGBackend::new(&filename, (768, 1024)).into_drawing_area();
        plot.fill(&WHITE).map_err(&err)?;
        let panels = plot.split_evenly((3, 1));

        let window = &report.profile[tf.window.clone()];
        let curves: [(&str, Vec<(f64, f64)>); 3] = [
            (
                "Zoomed edge",
                window
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| ((tf.window.start + i) as f64, v))
                    .collect(),
            ),
            (
                "LSF",
                tf.lsf
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| ((tf.window.start + i) as f64, v))
                    .collect(),
            ),
            (
                "MTF",
                tf.usable_mtf()
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (i as f64, v))
                    .collect(),
            ),
        ];
        let mut colors = colorous::TABLEAU10.iter().cycle();
        for (panel, (title, curve)) in panels.iter().zip(curves) {
            let (x_min, x_max) = minmax(&curve.iter().map(|(x, _)| *x).collect::<Vec<_>>());
            let (y_min, y_max) = minmax(&curve.iter().map(|(_, y)| *y).collect::<Vec<_>>());
            let y_pad = ((y_max - y_min) * 0.05).max(1e-3);
            let mut chart = ChartBuilder::on(panel)
                .caption(title, ("sans-serif", 18))
                .set_label_area_size(LabelAreaPosition::Left, 60)
                .set_label_area_size(LabelAreaPosition::Bottom, 40)
                .margin(10)
                .build_cartesian_2d(x_min..x_max.max(x_min + 1.), y_min - y_pad..y_max + y_pad)
                .map_err(&err)?;
            chart.configure_mesh().draw().map_err(&err)?;
            let color = colors.next().unwrap_or(&colorous::TABLEAU10[0]);
            chart
                .draw_series(LineSeries::new(curve, &RGBColor(color.r, color.g, color.b)))
                .map_err(&err)?;
        }
        plot.present().map_err(&err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        exposure::{classify, MeasuredSeries, Measurement, RetentionConfig, RetentionOutcome},
        mtf::{EdgeProfile, Orientation, TransferFunction},
    };

    #[test]
    fn series_figure() {
        let dir = tempfile::tempdir().unwrap();
        let series = MeasuredSeries::new(
            "root/run-01",
            (0..6)
                .map(|i| Measurement::new(format!("{i}.jpg"), 10. * i as f64))
                .collect(),
        );
        let classification = classify(&series, &RetentionConfig::default()).unwrap();
        let report = SeriesReport {
            series,
            classification,
            outcome: RetentionOutcome::Pruned(vec![]),
        };
        PlotReport::new(dir.path().join("figures"))
            .series(&report)
            .unwrap();
        assert!(dir.path().join("figures").join("run-01.svg").is_file());
    }

    #[test]
    fn transfer_figure() {
        let dir = tempfile::tempdir().unwrap();
        let values: Vec<f64> = (0..20).map(|i| if i < 10 { 0. } else { 10. }).collect();
        let profile = EdgeProfile::new(Orientation::Horizontal, 3, values);
        let transfer = TransferFunction::new(&profile, 9, 4).unwrap();
        PlotReport::new(dir.path())
            .transfer(&MtfReport {
                name: "edge",
                profile: &profile,
                transfer: &transfer,
            })
            .unwrap();
        assert!(dir.path().join("edge_horizontal.svg").is_file());
    }
}
